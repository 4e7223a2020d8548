//! Research source adapters behind a common trait.
//!
//! Each backend (arXiv, IEEE Xplore) gets one adapter implementing
//! [`Source`]. An adapter translates its backend's native query language,
//! pagination, and error surface into the shared [`Paper`]/[`Citation`]
//! model and the [`ApiError`] taxonomy. Adapters hold no mutable state
//! beyond credentials and an HTTP client, so one instance is safe to reuse
//! across calls and to share through the [`SourceRegistry`].

mod arxiv;
mod ieee;
pub mod mock;
mod registry;

pub use arxiv::ArxivSource;
pub use ieee::IeeeSource;
pub use mock::MockSource;
pub use registry::{MultiSearchResult, SourceFailure, SourceRegistry};

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Citation, CitationFormat, DownloadRequest, Paper, SearchQuery};

/// The contract every research source implements.
///
/// Failure paths raise exactly one taxonomy error; native backend errors
/// never cross this boundary.
#[async_trait]
pub trait Source: Send + Sync + fmt::Debug {
    /// Registry key, e.g. "arxiv", "ieee".
    fn id(&self) -> &str;

    /// Display name, e.g. "arXiv", "IEEE".
    fn name(&self) -> &str;

    /// Search for papers matching the query.
    ///
    /// Rejects empty/whitespace-only queries before any network call.
    /// Returns papers in the backend's native result order; zero backend
    /// records raise a retryable response error.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, ApiError>;

    /// Render a citation for one paper.
    ///
    /// An unresolvable `paper_id` raises a non-retryable response error; an
    /// unrecognized format still produces a best-effort Unknown citation.
    async fn get_citation(
        &self,
        paper_id: &str,
        format: CitationFormat,
    ) -> Result<Citation, ApiError>;

    /// Download the paper's PDF under `request.dirpath`, creating the
    /// directory if absent. Returns the written path.
    async fn download_paper(&self, request: &DownloadRequest) -> Result<PathBuf, ApiError>;
}

/// Shared precondition: reject empty/whitespace-only queries before any
/// network call is attempted.
pub(crate) fn ensure_query_present(source: &str, query: &SearchQuery) -> Result<(), ApiError> {
    if query.query.trim().is_empty() {
        return Err(ApiError::response(
            source,
            "empty_query",
            "search query cannot be empty",
            false,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        let query = SearchQuery::new("   ");
        let err = ensure_query_present("arxiv", &query).unwrap_err();
        assert_eq!(err.code(), "arxiv:empty_query");
        assert!(!err.retryable());
        assert!(ensure_query_present("arxiv", &SearchQuery::new("quantum")).is_ok());
    }
}
