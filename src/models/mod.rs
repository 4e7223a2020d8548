//! Core data structures shared by every research source.

mod citation;
mod paper;
mod query;

pub use citation::{Citation, CitationFormat};
pub use paper::{parse_iso_date, Paper, PaperBuilder};
pub use query::{DownloadRequest, SearchQuery, SortBy, SortOrder};
