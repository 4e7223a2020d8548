//! Citation string rendering.
//!
//! All adapters render citations through these templates so a reference
//! looks the same no matter which backend resolved the paper.

use crate::models::{Citation, CitationFormat, Paper};

/// Render a citation string. Authors are joined with `", "`; a missing year
/// renders as `n.d.`.
///
/// Templates:
/// - MLA:     `{authors}. "{title}." {source}, {year}, {url}.`
/// - APA:     `{authors} ({year}). {title}. {source}. {url}`
/// - Chicago: `{authors}. "{title}." {source} ({year}). {url}.`
/// - Unknown: best-effort `{authors}. {title} ({year}). {url}`
pub fn render(
    format: CitationFormat,
    authors: &[String],
    title: &str,
    source: &str,
    year: Option<i32>,
    url: Option<&str>,
) -> String {
    let authors = authors.join(", ");
    let year = year.map_or_else(|| "n.d.".to_string(), |y| y.to_string());
    let url = url.unwrap_or_default();

    match format {
        CitationFormat::Mla => {
            format!("{}. \"{}.\" {}, {}, {}.", authors, title, source, year, url)
        }
        CitationFormat::Apa => {
            format!("{} ({}). {}. {}. {}", authors, year, title, source, url)
        }
        CitationFormat::Chicago => {
            format!("{}. \"{}.\" {} ({}). {}.", authors, title, source, year, url)
        }
        CitationFormat::Unknown => {
            format!("{}. {} ({}). {}", authors, title, year, url)
        }
    }
}

/// Build a [`Citation`] from a resolved paper. `url` is the paper's landing
/// page (abs URL, DOI link, or document page depending on source).
pub fn build_citation(paper: &Paper, format: CitationFormat, url: Option<String>) -> Citation {
    let citation_str = render(
        format,
        &paper.authors,
        &paper.title,
        &paper.source,
        paper.year(),
        url.as_deref(),
    );
    Citation {
        id: paper.id.clone(),
        title: paper.title.clone(),
        citation_format: format,
        citation_str,
        authors: paper.authors.clone(),
        year: paper.year(),
        source: paper.source.clone(),
        url,
    }
}
