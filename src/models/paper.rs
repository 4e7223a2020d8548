//! Paper model representing a research paper from any source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A research paper normalized across all sources.
///
/// `id` is the source-native identifier: unique within its source, not
/// globally unique. `id` and `title` are always present; every other field
/// may be absent depending on source completeness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Source-native identifier (arXiv ID, IEEE article number, ...).
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Ordered author display names.
    pub authors: Vec<String>,

    /// Abstract text.
    pub abstract_text: String,

    /// Direct PDF URL, when the source exposes one.
    pub pdf_url: Option<String>,

    /// Submission/publication date.
    pub publication_date: Option<NaiveDate>,

    /// Name of the source that produced this record (e.g. "arXiv").
    pub source: String,

    /// Digital Object Identifier.
    pub doi: Option<String>,

    /// Citation count reported by the source.
    pub citation_count: u32,
}

impl Paper {
    /// Create a paper with the required fields; everything else absent.
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            abstract_text: String::new(),
            pdf_url: None,
            publication_date: None,
            source: source.into(),
            doi: None,
            citation_count: 0,
        }
    }

    /// Publication year, when a date is known.
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.publication_date.map(|d| d.year())
    }

    /// Whether the source exposed a downloadable PDF.
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.is_some()
    }
}

/// Builder for constructing [`Paper`] records inside adapters.
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            paper: Paper::new(id, title, source),
        }
    }

    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.paper.authors = authors;
        self
    }

    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.paper.abstract_text = text.into();
        self
    }

    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.paper.pdf_url = Some(url.into());
        self
    }

    pub fn publication_date(mut self, date: NaiveDate) -> Self {
        self.paper.publication_date = Some(date);
        self
    }

    /// Parse an ISO `YYYY-MM-DD` date; anything else degrades the field to
    /// absent rather than failing the record.
    pub fn publication_date_str(mut self, date: &str) -> Self {
        self.paper.publication_date = parse_iso_date(date);
        self
    }

    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        let doi = doi.into();
        if !doi.is_empty() {
            self.paper.doi = Some(doi);
        }
        self
    }

    pub fn citation_count(mut self, count: u32) -> Self {
        self.paper.citation_count = count;
        self
    }

    pub fn build(self) -> Paper {
        self.paper
    }
}

/// Lenient ISO date parsing: accepts `YYYY-MM-DD` or an RFC 3339 timestamp
/// prefix; returns `None` for anything else.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() >= 10 {
        if let Ok(date) = NaiveDate::parse_from_str(&value[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let paper = PaperBuilder::new("2301.12345", "Test Paper", "arXiv")
            .authors(vec!["Ada Lovelace".into(), "Alan Turing".into()])
            .abstract_text("An abstract.")
            .pdf_url("https://arxiv.org/pdf/2301.12345.pdf")
            .publication_date_str("2023-01-15")
            .doi("10.1234/test")
            .citation_count(7)
            .build();

        assert_eq!(paper.id, "2301.12345");
        assert_eq!(paper.authors.len(), 2);
        assert_eq!(paper.year(), Some(2023));
        assert_eq!(paper.doi.as_deref(), Some("10.1234/test"));
        assert_eq!(paper.citation_count, 7);
        assert!(paper.has_pdf());
    }

    #[test]
    fn defaults_are_absent() {
        let paper = Paper::new("42", "Minimal", "IEEE");
        assert!(paper.authors.is_empty());
        assert!(paper.publication_date.is_none());
        assert!(paper.doi.is_none());
        assert_eq!(paper.citation_count, 0);
        assert!(!paper.has_pdf());
    }

    #[test]
    fn non_iso_date_degrades_to_absent() {
        let paper = PaperBuilder::new("42", "Odd Dates", "IEEE")
            .publication_date_str("Jan 2019")
            .build();
        assert!(paper.publication_date.is_none());

        let paper = PaperBuilder::new("43", "Timestamp", "arXiv")
            .publication_date_str("2023-01-15T10:00:00Z")
            .build();
        assert_eq!(paper.year(), Some(2023));
    }

    #[test]
    fn empty_doi_stays_absent() {
        let paper = PaperBuilder::new("44", "No DOI", "IEEE").doi("").build();
        assert!(paper.doi.is_none());
    }
}
