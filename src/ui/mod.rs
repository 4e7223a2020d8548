//! Terminal rendering for papers and citations.

use std::io::{stdout, IsTerminal};

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::models::{Citation, Paper};

/// Output format selected by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table when stdout is a TTY, JSON otherwise.
    Auto,
    Table,
    Json,
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> OutputFormat {
        match self {
            OutputFormat::Auto => {
                if stdout().is_terminal() {
                    OutputFormat::Table
                } else {
                    OutputFormat::Json
                }
            }
            other => other,
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Render search results in the selected format.
pub fn render_papers(papers: &[Paper], format: OutputFormat) -> String {
    match format.resolve() {
        OutputFormat::Json => {
            serde_json::to_string_pretty(papers).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Plain => papers
            .iter()
            .map(|p| {
                format!(
                    "{} [{}] {} ({})",
                    p.id,
                    p.source,
                    p.title,
                    p.year().map_or_else(|| "n.d.".into(), |y| y.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "ID", "Title", "Authors", "Year", "Source"]);
            for (i, paper) in papers.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(&paper.id),
                    Cell::new(truncate(&paper.title, 60)),
                    Cell::new(truncate(&paper.authors.join(", "), 40)),
                    Cell::new(
                        paper
                            .year()
                            .map_or_else(|| "n.d.".to_string(), |y| y.to_string()),
                    ),
                    Cell::new(&paper.source),
                ]);
            }
            table.to_string()
        }
    }
}

/// Render a citation in the selected format.
pub fn render_citation(citation: &Citation, format: OutputFormat) -> String {
    match format.resolve() {
        OutputFormat::Json => serde_json::to_string_pretty(citation)
            .unwrap_or_else(|_| citation.citation_str.clone()),
        _ => citation.citation_str.clone(),
    }
}

/// Print a per-source failure diagnostic to stderr.
pub fn print_source_warning(source: &str, message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} {}: {}", "warning:".yellow().bold(), source, message);
    } else {
        eprintln!("warning: {}: {}", source, message);
    }
}

/// Print a fatal error as `[code] message` to stderr.
pub fn print_error(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} {}", "error:".red().bold(), message);
    } else {
        eprintln!("error: {}", message);
    }
}
