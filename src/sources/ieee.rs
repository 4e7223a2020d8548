//! IEEE Xplore research source implementation.
//!
//! Uses the IEEE Xplore REST API for search and metadata. Xplore has no
//! SDK-level download call, so PDFs come from a direct GET against the
//! stampPDF endpoint with browser-like headers.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Citation, CitationFormat, DownloadRequest, Paper, PaperBuilder, SearchQuery, SortBy, SortOrder};
use crate::sources::{ensure_query_present, Source};
use crate::utils::{cite, transport_error, HttpClient};

const SOURCE_ID: &str = "ieee";
const SOURCE_NAME: &str = "IEEE";

const IEEE_API_BASE: &str = "https://ieeexploreapi.ieee.org/api/v1/search/articles";
const IEEE_PDF_BASE: &str = "https://ieeexplore.ieee.org/stampPDF/getPDF.jsp";
const IEEE_DOC_URL: &str = "https://ieeexplore.ieee.org/document";

/// Xplore caps max_records at 100; larger limits are silently clamped.
const IEEE_MAX_RECORDS: usize = 100;

/// Socket timeout for the stampPDF download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// The stampPDF endpoint refuses non-browser user agents.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0",
    ),
    ("Accept", "application/pdf,*/*"),
    ("Referer", "https://ieeexplore.ieee.org/"),
];

/// IEEE Xplore research source.
///
/// Requires an API key; construction without one fails with
/// `ieee:missing_api_key` before any call can be made.
#[derive(Debug, Clone)]
pub struct IeeeSource {
    client: HttpClient,
    api_key: String,
    api_base: String,
    pdf_base: String,
}

impl IeeeSource {
    pub fn new(api_key: Option<String>) -> Result<Self, ApiError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            ApiError::auth(
                SOURCE_ID,
                "missing_api_key",
                "IEEE_API_KEY is not configured",
            )
        })?;
        let client = HttpClient::new()
            .map_err(|e| ApiError::request(SOURCE_ID, "client_error", e.to_string(), false))?;
        Ok(Self {
            client,
            api_key,
            api_base: IEEE_API_BASE.to_string(),
            pdf_base: IEEE_PDF_BASE.to_string(),
        })
    }

    /// Construct from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_keys.ieee.clone())
    }

    /// Point the adapter at different endpoints (for tests).
    pub fn with_base_urls(mut self, api_base: impl Into<String>, pdf_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.pdf_base = pdf_base.into();
        self
    }

    /// Xplore-side query restrictions, checked before any network call:
    /// at most 2 wildcards, and each wildcard term needs at least 3
    /// characters before its `*`.
    fn validate_query_text(query: &str) -> Result<(), ApiError> {
        let wildcards = query.matches('*').count();
        if wildcards > 2 {
            return Err(ApiError::response(
                SOURCE_ID,
                "too_many_wildcards",
                format!("query uses {} wildcards; IEEE allows at most 2", wildcards),
                false,
            ));
        }
        for term in query.split_whitespace() {
            if let Some(prefix_len) = term.find('*') {
                if prefix_len < 3 {
                    return Err(ApiError::response(
                        SOURCE_ID,
                        "invalid_wildcard",
                        format!(
                            "wildcard term \"{}\" is too short; IEEE requires 3 characters before *",
                            term
                        ),
                        false,
                    )
                    .with_meta("term", Value::from(term)));
                }
            }
        }
        Ok(())
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}?apikey={}&format=json&start_record=1&max_records={}&querytext={}",
            self.api_base,
            urlencoding::encode(&self.api_key),
            query.limit.min(IEEE_MAX_RECORDS),
            urlencoding::encode(query.query.trim()),
        );

        if let Some(author) = query.author.as_deref().filter(|a| !a.trim().is_empty()) {
            url.push_str(&format!("&author={}", urlencoding::encode(author.trim())));
        }
        if let Some(after) = query.after {
            url.push_str(&format!(
                "&insertion_start_date={}",
                after.format("%Y%m%d")
            ));
        }
        if let Some(before) = query.before {
            url.push_str(&format!(
                "&insertion_end_date={}",
                before.format("%Y%m%d")
            ));
        }
        match query.sort_by {
            SortBy::Relevance => {}
            SortBy::LastUpdatedDate | SortBy::SubmittedDate => {
                let order = match query.sort_order {
                    SortOrder::Ascending => "asc",
                    SortOrder::Descending => "desc",
                };
                url.push_str(&format!("&sort_field=publication_year&sort_order={}", order));
            }
        }
        url
    }

    /// Issue a search-articles call and decode the JSON envelope.
    async fn call_api(&self, url: &str) -> Result<IeeeSearchResponse, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(SOURCE_ID, &e))?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(match code {
                401 | 403 => ApiError::auth(
                    SOURCE_ID,
                    "invalid_api_key",
                    "IEEE rejected the API key",
                )
                .with_status(code),
                429 => ApiError::quota(SOURCE_ID, "rate_limited", "IEEE quota exceeded")
                    .with_status(code),
                _ if status.is_server_error() => ApiError::service(
                    SOURCE_ID,
                    "service_error",
                    format!("IEEE returned HTTP {}", code),
                )
                .with_status(code),
                _ => ApiError::request(
                    SOURCE_ID,
                    "http_error",
                    format!("IEEE returned HTTP {}", code),
                    false,
                )
                .with_status(code)
                .with_meta("body", Value::from(body.chars().take(200).collect::<String>())),
            });
        }

        response.json::<IeeeSearchResponse>().await.map_err(|e| {
            ApiError::response(
                SOURCE_ID,
                "parse_error",
                format!("invalid IEEE response: {}", e),
                false,
            )
        })
    }

    /// Map one Xplore record to a Paper. Missing required fields fail the
    /// batch instead of producing a partial record.
    fn parse_record(article: &IeeeArticle) -> Result<Paper, ApiError> {
        let missing = |field: &str| {
            ApiError::response(
                SOURCE_ID,
                "missing_field",
                format!("IEEE record is missing {}", field),
                false,
            )
            .with_meta("field", Value::from(field))
        };

        let id = article
            .article_number
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("article_number"))?;
        let title = article
            .title
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("title"))?;

        let authors = article
            .authors
            .as_ref()
            .map(|a| {
                a.authors
                    .iter()
                    .filter_map(|author| author.full_name.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut builder = PaperBuilder::new(id, title, SOURCE_NAME)
            .authors(authors)
            .abstract_text(article.abstract_text.clone().unwrap_or_default())
            .citation_count(article.citing_paper_count.unwrap_or(0));

        if let Some(doi) = article.doi.as_deref() {
            builder = builder.doi(doi);
        }
        if let Some(pdf_url) = article.pdf_url.as_deref().filter(|s| !s.is_empty()) {
            builder = builder.pdf_url(pdf_url);
        }
        if let Some(date) = article.publication_date.as_deref() {
            builder = builder.publication_date_str(date);
        }

        let mut paper = builder.build();
        // Xplore dates come as "1 Jan. 2023" more often than ISO; fall back
        // to publication_year so citations keep their year.
        if paper.publication_date.is_none() {
            if let Some(year) = article
                .publication_year
                .as_deref()
                .and_then(|y| y.parse::<i32>().ok())
            {
                paper.publication_date = NaiveDate::from_ymd_opt(year, 1, 1);
            }
        }
        Ok(paper)
    }

    /// Resolve a single paper by article number.
    async fn get_by_id(&self, paper_id: &str) -> Result<Paper, ApiError> {
        let url = format!(
            "{}?apikey={}&format=json&article_number={}",
            self.api_base,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(paper_id.trim()),
        );
        let response = self.call_api(&url).await?;
        let article = response
            .articles
            .as_ref()
            .and_then(|a| a.first())
            .ok_or_else(|| {
                ApiError::response(
                    SOURCE_ID,
                    "paper_not_found",
                    format!("no IEEE article with number {}", paper_id),
                    false,
                )
            })?;
        Self::parse_record(article)
    }

    fn landing_url(paper: &Paper) -> String {
        match &paper.doi {
            Some(doi) => format!("https://doi.org/{}", doi),
            None => format!("{}/{}", IEEE_DOC_URL, paper.id),
        }
    }
}

#[async_trait]
impl Source for IeeeSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, ApiError> {
        ensure_query_present(SOURCE_ID, query)?;
        Self::validate_query_text(query.query.trim())?;

        let url = self.search_url(query);
        tracing::debug!(query = %query.query, limit = query.limit, "searching ieee");
        let response = self.call_api(&url).await?;

        let articles = response.articles.unwrap_or_default();
        if articles.is_empty() {
            return Err(ApiError::response(
                SOURCE_ID,
                "no_results",
                format!("no IEEE results for \"{}\"", query.query.trim()),
                true,
            ));
        }

        articles.iter().map(Self::parse_record).collect()
    }

    async fn get_citation(
        &self,
        paper_id: &str,
        format: CitationFormat,
    ) -> Result<Citation, ApiError> {
        let paper = self.get_by_id(paper_id).await?;
        let url = Self::landing_url(&paper);
        Ok(cite::build_citation(&paper, format, Some(url)))
    }

    async fn download_paper(&self, request: &DownloadRequest) -> Result<PathBuf, ApiError> {
        // Resolve first so a bad id reports paper_not_found instead of
        // whatever the stampPDF endpoint answers for unknown numbers.
        let paper = self.get_by_id(&request.paper_id).await?;

        let pdf_url = format!(
            "{}?tp=&isnumber=&arnumber={}",
            self.pdf_base,
            urlencoding::encode(&paper.id)
        );
        self.client
            .download_pdf(
                SOURCE_ID,
                &pdf_url,
                request,
                BROWSER_HEADERS,
                Some(DOWNLOAD_TIMEOUT),
            )
            .await
    }
}

/// Xplore search-articles envelope.
#[derive(Debug, Deserialize)]
struct IeeeSearchResponse {
    #[serde(default)]
    #[allow(dead_code)]
    total_records: Option<u64>,
    #[serde(default)]
    articles: Option<Vec<IeeeArticle>>,
}

#[derive(Debug, Deserialize)]
struct IeeeArticle {
    article_number: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    doi: Option<String>,
    pdf_url: Option<String>,
    publication_date: Option<String>,
    publication_year: Option<String>,
    citing_paper_count: Option<u32>,
    authors: Option<IeeeAuthors>,
}

#[derive(Debug, Deserialize)]
struct IeeeAuthors {
    #[serde(default)]
    authors: Vec<IeeeAuthor>,
}

#[derive(Debug, Deserialize)]
struct IeeeAuthor {
    full_name: Option<String>,
}
