//! Search and download request models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sort field for search results.
///
/// Unrecognized values parse to [`SortBy::Relevance`], the uniform fallback
/// across adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl SortBy {
    /// Case-insensitive parse with fallback to relevance.
    pub fn parse_or_default(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "last_updated_date" => SortBy::LastUpdatedDate,
            "submitted_date" => SortBy::SubmittedDate,
            _ => SortBy::Relevance,
        }
    }
}

/// Sort order for search results.
///
/// Unrecognized values parse to [`SortOrder::Descending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Case-insensitive parse with fallback to descending.
    pub fn parse_or_default(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "ascending" => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }
}

/// Search query parameters shared by all adapters.
///
/// `before`/`after` are inclusive calendar-date bounds on submission or
/// insertion date. When both are given the adapter passes them through
/// unchanged, ordering included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search terms. Adapters reject empty/whitespace-only queries
    /// before issuing any network call.
    pub query: String,

    /// Maximum results; silently clamped to the backend maximum.
    pub limit: usize,

    /// Inclusive upper date bound.
    pub before: Option<NaiveDate>,

    /// Inclusive lower date bound.
    pub after: Option<NaiveDate>,

    /// Author name filter.
    pub author: Option<String>,

    pub sort_by: SortBy,

    pub sort_order: SortOrder,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: 10,
            before: None,
            after: None,
            author: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn before(mut self, date: NaiveDate) -> Self {
        self.before = Some(date);
        self
    }

    pub fn after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }
}

/// Request for downloading a paper's PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Paper ID (source-specific).
    pub paper_id: String,

    /// Directory to save into; created if absent.
    pub dirpath: PathBuf,

    /// Optional filename stem; defaults to the paper id. The `.pdf`
    /// extension is appended either way.
    pub filename: Option<String>,
}

impl DownloadRequest {
    pub fn new(paper_id: impl Into<String>, dirpath: impl Into<PathBuf>) -> Self {
        Self {
            paper_id: paper_id.into(),
            dirpath: dirpath.into(),
            filename: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Target path for the written PDF.
    pub fn target_path(&self) -> PathBuf {
        let stem = self.filename.as_deref().unwrap_or(&self.paper_id);
        // Keep ids like "math.GT/0104020" from escaping the directory.
        let stem = stem.replace(['/', '\\'], "_");
        self.dirpath.join(format!("{}.pdf", stem))
    }
}
