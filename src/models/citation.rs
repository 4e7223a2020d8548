//! Citation model and format selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Citation style requested by the caller.
///
/// Callers address styles by numeric code (0 = MLA, 1 = APA, 2 = Chicago);
/// any other code degrades to [`CitationFormat::Unknown`], which still
/// renders a best-effort citation string instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitationFormat {
    Mla,
    Apa,
    Chicago,
    Unknown,
}

impl CitationFormat {
    /// Map a numeric format code to a style. Out-of-range codes are Unknown.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => CitationFormat::Mla,
            1 => CitationFormat::Apa,
            2 => CitationFormat::Chicago,
            _ => CitationFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CitationFormat::Mla => "MLA",
            CitationFormat::Apa => "APA",
            CitationFormat::Chicago => "Chicago",
            CitationFormat::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CitationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered bibliographic reference for one paper.
///
/// Built on demand per `get_citation` call; stateless, not cached, not
/// persisted. `citation_str` is non-empty whenever the format is known; for
/// Unknown it still carries the best-effort data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub citation_format: CitationFormat,
    pub citation_str: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub source: String,
    pub url: Option<String>,
}
