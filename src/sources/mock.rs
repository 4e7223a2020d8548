//! Mock source for testing registry and caller behavior.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Citation, CitationFormat, DownloadRequest, Paper, SearchQuery};
use crate::sources::{ensure_query_present, Source};
use crate::utils::cite;

/// A source that answers from canned data instead of the network.
///
/// Mirrors the real adapter contract: empty queries and empty result sets
/// raise the same taxonomy errors the live adapters would.
#[derive(Debug, Clone)]
pub struct MockSource {
    id: String,
    papers: Vec<Paper>,
    fail_with: Option<ApiError>,
}

impl MockSource {
    pub fn with_papers(id: impl Into<String>, papers: Vec<Paper>) -> Self {
        Self {
            id: id.into(),
            papers,
            fail_with: None,
        }
    }

    /// A source whose every operation fails with the given error.
    pub fn failing(id: impl Into<String>, error: ApiError) -> Self {
        Self {
            id: id.into(),
            papers: Vec::new(),
            fail_with: Some(error),
        }
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, ApiError> {
        ensure_query_present(&self.id, query)?;
        self.check_failure()?;
        if self.papers.is_empty() {
            return Err(ApiError::response(
                &self.id,
                "no_results",
                "mock has no papers",
                true,
            ));
        }
        Ok(self.papers.iter().take(query.limit).cloned().collect())
    }

    async fn get_citation(
        &self,
        paper_id: &str,
        format: CitationFormat,
    ) -> Result<Citation, ApiError> {
        self.check_failure()?;
        let paper = self
            .papers
            .iter()
            .find(|p| p.id == paper_id)
            .ok_or_else(|| {
                ApiError::response(
                    &self.id,
                    "paper_not_found",
                    format!("no mock paper with id {}", paper_id),
                    false,
                )
            })?;
        Ok(cite::build_citation(paper, format, paper.pdf_url.clone()))
    }

    async fn download_paper(&self, request: &DownloadRequest) -> Result<PathBuf, ApiError> {
        self.check_failure()?;
        if !self.papers.iter().any(|p| p.id == request.paper_id) {
            return Err(ApiError::response(
                &self.id,
                "paper_not_found",
                format!("no mock paper with id {}", request.paper_id),
                false,
            ));
        }
        Ok(request.target_path())
    }
}
