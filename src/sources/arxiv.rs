//! arXiv research source implementation.
//!
//! Talks to the arXiv Atom query API and maps its feed entries into the
//! normalized paper model. No credentials required.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Citation, CitationFormat, DownloadRequest, Paper, PaperBuilder, SearchQuery, SortBy, SortOrder};
use crate::sources::{ensure_query_present, Source};
use crate::utils::{cite, transport_error, HttpClient};

const SOURCE_ID: &str = "arxiv";
const SOURCE_NAME: &str = "arXiv";

/// Base URL for the arXiv query API.
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
/// Base URL for arXiv PDFs.
const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";
/// Base URL for arXiv abstract pages.
const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

/// arXiv caps a single query page at 2000 results.
const ARXIV_MAX_RESULTS: usize = 2000;

/// HTTP attempts per query before the failure is surfaced as non-retryable.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// arXiv research source.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    api_url: String,
    pdf_url: String,
    max_retries: u32,
}

impl ArxivSource {
    pub fn new() -> Result<Self, ApiError> {
        let client = HttpClient::new()
            .map_err(|e| ApiError::request(SOURCE_ID, "client_error", e.to_string(), false))?;
        Ok(Self {
            client,
            api_url: ARXIV_API_URL.to_string(),
            pdf_url: ARXIV_PDF_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Point the adapter at a different API endpoint (for tests).
    pub fn with_base_urls(mut self, api_url: impl Into<String>, pdf_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.pdf_url = pdf_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Normalize an arXiv ID from the formats users paste in:
    /// `2301.12345`, `2301.12345v2`, `arxiv:2301.12345`,
    /// `https://arxiv.org/abs/2301.12345v1`. Version suffixes are stripped.
    pub fn parse_id(id: &str) -> Result<String, ApiError> {
        let id = id.trim();

        let id = if let Some(abs_pos) = id.find("/abs/") {
            &id[abs_pos + 5..]
        } else {
            id.strip_prefix("arxiv:").or_else(|| id.strip_prefix("arXiv:")).unwrap_or(id)
        };

        let id = Self::strip_version(id);

        if id.is_empty() {
            return Err(ApiError::response(
                SOURCE_ID,
                "invalid_id",
                "empty arXiv ID",
                false,
            ));
        }
        Ok(id.to_string())
    }

    /// Strip a trailing version suffix like `v2`. Only an all-digit tail
    /// after the last `v` counts: old-style ids with an embedded `v`
    /// (`solv-int/9701001`) pass through untouched.
    fn strip_version(id: &str) -> &str {
        match id.rfind('v') {
            Some(pos) if pos > 0 && id[pos + 1..].chars().all(|c| c.is_ascii_digit()) => {
                &id[..pos]
            }
            _ => id,
        }
    }

    /// Build the arXiv query string: base terms plus `au:` and
    /// `submittedDate:` clauses joined with AND, `*` marking open bounds.
    fn build_search_query(query: &SearchQuery) -> String {
        let mut parts = vec![query.query.trim().to_string()];

        if let Some(author) = query.author.as_deref().filter(|a| !a.trim().is_empty()) {
            parts.push(format!("au:{}", author.trim()));
        }
        if query.before.is_some() || query.after.is_some() {
            let start = query
                .after
                .map_or_else(|| "*".to_string(), |d| d.format("%Y-%m-%d").to_string());
            let end = query
                .before
                .map_or_else(|| "*".to_string(), |d| d.format("%Y-%m-%d").to_string());
            parts.push(format!("submittedDate:[{} TO {}]", start, end));
        }

        parts.join(" AND ")
    }

    fn sort_params(query: &SearchQuery) -> (&'static str, &'static str) {
        let sort_by = match query.sort_by {
            SortBy::Relevance => "relevance",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
            SortBy::SubmittedDate => "submittedDate",
        };
        let sort_order = match query.sort_order {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        };
        (sort_by, sort_order)
    }

    /// Fetch and parse an Atom feed, retrying transient failures up to the
    /// adapter's budget. Once the budget is exhausted the surfaced request
    /// error is non-retryable: the caller's attempts are spent.
    async fn fetch_feed(&self, url: &str) -> Result<Feed, ApiError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let budget_left = attempt < self.max_retries;

            let error = match self
                .client
                .get(url)
                .header("Accept", "application/atom+xml")
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let bytes = response
                            .bytes()
                            .await
                            .map_err(|e| transport_error(SOURCE_ID, &e))?;
                        return parser::parse(bytes.as_ref()).map_err(|e| {
                            ApiError::response(
                                SOURCE_ID,
                                "parse_error",
                                format!("invalid Atom feed: {}", e),
                                false,
                            )
                        });
                    }
                    match status.as_u16() {
                        429 => {
                            return Err(ApiError::quota(
                                SOURCE_ID,
                                "rate_limited",
                                "arXiv rate limit exceeded",
                            )
                            .with_status(429))
                        }
                        403 => {
                            return Err(ApiError::auth(
                                SOURCE_ID,
                                "forbidden",
                                "arXiv denied the request",
                            )
                            .with_status(403))
                        }
                        code if status.is_server_error() => {
                            ApiError::request(
                                SOURCE_ID,
                                "http_error",
                                format!("arXiv returned HTTP {}", code),
                                budget_left,
                            )
                            .with_status(code)
                            .with_meta("attempt", Value::from(attempt))
                        }
                        code => {
                            return Err(ApiError::request(
                                SOURCE_ID,
                                "http_error",
                                format!("arXiv returned HTTP {}", code),
                                false,
                            )
                            .with_status(code))
                        }
                    }
                }
                Err(e) => {
                    let mut mapped = transport_error(SOURCE_ID, &e)
                        .with_meta("attempt", Value::from(attempt));
                    if !budget_left {
                        if let ApiError::Request { detail, .. } = &mut mapped {
                            detail.retryable = false;
                        }
                    }
                    mapped
                }
            };

            if !budget_left {
                return Err(error);
            }
            tracing::debug!(attempt, max = self.max_retries, %error, "arxiv fetch failed, retrying");
            tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
        }
    }

    /// Map one Atom entry to a Paper. A missing identifier or title fails
    /// the whole search rather than emitting a partial record.
    fn parse_entry(&self, entry: &Entry) -> Result<Paper, ApiError> {
        let id = entry
            .id
            .split("/abs/")
            .last()
            .map(|s| Self::strip_version(s).to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ApiError::response(SOURCE_ID, "missing_field", "entry has no arXiv ID", false)
                    .with_meta("field", Value::from("id"))
            })?;

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::response(SOURCE_ID, "missing_field", "entry has no title", false)
                    .with_meta("field", Value::from("title"))
            })?;

        let authors = entry
            .authors
            .iter()
            .map(|a| a.name.clone())
            .collect::<Vec<_>>();

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default();

        let pdf_link = entry
            .links
            .iter()
            .find(|l| l.media_type.as_deref() == Some("application/pdf"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| format!("{}/{}.pdf", self.pdf_url, id));

        let mut builder = PaperBuilder::new(id, title, SOURCE_NAME)
            .authors(authors)
            .abstract_text(abstract_text)
            .pdf_url(pdf_link);

        if let Some(published) = entry.published {
            builder = builder.publication_date(published.date_naive());
        }

        Ok(builder.build())
    }

    /// Resolve a single paper by ID.
    async fn get_by_id(&self, paper_id: &str) -> Result<Paper, ApiError> {
        let id = Self::parse_id(paper_id)?;
        let url = format!(
            "{}?id_list={}&max_results=1",
            self.api_url,
            urlencoding::encode(&id)
        );
        let feed = self.fetch_feed(&url).await?;
        // An unknown id yields a feed whose single entry carries no
        // /abs/ identifier; treat both shapes as not found.
        feed.entries
            .iter()
            .filter(|e| e.id.contains("/abs/"))
            .map(|e| self.parse_entry(e))
            .next()
            .unwrap_or_else(|| {
                Err(ApiError::response(
                    SOURCE_ID,
                    "paper_not_found",
                    format!("no arXiv paper with id {}", id),
                    false,
                ))
            })
    }

    fn abs_url(paper_id: &str) -> String {
        format!("{}/{}", ARXIV_ABS_URL, paper_id)
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, ApiError> {
        ensure_query_present(SOURCE_ID, query)?;

        let search_query = Self::build_search_query(query);
        let (sort_by, sort_order) = Self::sort_params(query);
        let limit = query.limit.min(ARXIV_MAX_RESULTS);

        let url = format!(
            "{}?search_query={}&start=0&max_results={}&sortBy={}&sortOrder={}",
            self.api_url,
            urlencoding::encode(&search_query),
            limit,
            sort_by,
            sort_order
        );

        tracing::debug!(%search_query, limit, "searching arxiv");
        let feed = self.fetch_feed(&url).await?;

        if feed.entries.is_empty() {
            return Err(ApiError::response(
                SOURCE_ID,
                "no_results",
                format!("no arXiv results for \"{}\"", query.query.trim()),
                true,
            ));
        }

        feed.entries.iter().map(|e| self.parse_entry(e)).collect()
    }

    async fn get_citation(
        &self,
        paper_id: &str,
        format: CitationFormat,
    ) -> Result<Citation, ApiError> {
        let paper = self.get_by_id(paper_id).await?;
        let url = Self::abs_url(&paper.id);
        Ok(cite::build_citation(&paper, format, Some(url)))
    }

    async fn download_paper(&self, request: &DownloadRequest) -> Result<PathBuf, ApiError> {
        let paper = self.get_by_id(&request.paper_id).await?;
        let pdf_url = paper.pdf_url.ok_or_else(|| {
            ApiError::response(
                SOURCE_ID,
                "no_pdf",
                format!("arXiv paper {} has no PDF", paper.id),
                false,
            )
        })?;
        self.client
            .download_pdf(SOURCE_ID, &pdf_url, request, &[], None)
            .await
    }
}
