use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use iwadi::config::Config;
use iwadi::models::{CitationFormat, DownloadRequest, SearchQuery, SortBy, SortOrder};
use iwadi::sources::{ArxivSource, IeeeSource, SourceRegistry};
use iwadi::ui::{self, OutputFormat};
use iwadi::ApiError;

/// Search, cite, and download academic papers from multiple research sources
#[derive(Parser, Debug)]
#[command(name = "iwadi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search, cite, and download academic papers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = CliFormat::Auto)]
    output: CliFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CliFormat {
    Auto,
    Table,
    Json,
    Plain,
}

impl From<CliFormat> for OutputFormat {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::Auto => OutputFormat::Auto,
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search research papers across multiple sources
    Search {
        /// Search terms
        query: String,

        /// Filter by author name
        #[arg(long, short)]
        author: Option<String>,

        /// Year after (inclusive)
        #[arg(long)]
        after: Option<i32>,

        /// Year before (inclusive)
        #[arg(long)]
        before: Option<i32>,

        /// Sources to search (repeatable)
        #[arg(long = "source", short, default_values_t = vec!["arxiv".to_string(), "ieee".to_string()])]
        sources: Vec<String>,

        /// Sort method: relevance, last_updated_date, submitted_date
        #[arg(long = "sort", default_value = "relevance")]
        sort_by: String,

        /// Sort order: ascending, descending
        #[arg(long = "order", default_value = "descending")]
        sort_order: String,

        /// Maximum results per source
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// Render a citation for one paper
    Cite {
        /// Source to resolve the paper in
        source: String,

        /// Paper ID (source-specific)
        paper_id: String,

        /// Citation format: 0 = MLA, 1 = APA, 2 = Chicago
        #[arg(long, short, default_value_t = 0)]
        format: i64,
    },

    /// Download a paper's PDF
    Download {
        /// Source to resolve the paper in
        source: String,

        /// Paper ID (source-specific)
        paper_id: String,

        /// Directory to save into
        #[arg(long, short)]
        dir: Option<PathBuf>,

        /// Filename stem (defaults to the paper id)
        #[arg(long, short)]
        filename: Option<String>,
    },

    /// List registered sources
    Sources,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("iwadi={}", default)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Construct every adapter once at startup and hand them to the registry.
fn build_registry(config: &Config) -> Result<SourceRegistry, ApiError> {
    let mut registry = SourceRegistry::new();
    registry.register(Arc::new(ArxivSource::new()?));

    // The IEEE credential is fatal at adapter construction; without one the
    // process keeps the remaining sources and "ieee" becomes unknown.
    match IeeeSource::from_config(config) {
        Ok(source) => registry.register(Arc::new(source)),
        Err(error) => tracing::warn!(%error, "IEEE source unavailable"),
    }

    Ok(registry)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    let registry = build_registry(&config)?;
    let format = OutputFormat::from(cli.output);

    match cli.command {
        Commands::Search {
            query,
            author,
            after,
            before,
            sources,
            sort_by,
            sort_order,
            limit,
        } => {
            let mut search = SearchQuery::new(query)
                .limit(limit)
                .sort_by(SortBy::parse_or_default(&sort_by))
                .sort_order(SortOrder::parse_or_default(&sort_order));
            if let Some(author) = author {
                search = search.author(author);
            }
            // Year bounds expand to inclusive calendar dates.
            if let Some(year) = after {
                if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
                    search = search.after(date);
                }
            }
            if let Some(year) = before {
                if let Some(date) = NaiveDate::from_ymd_opt(year, 12, 31) {
                    search = search.before(date);
                }
            }

            let result = registry.search(&sources, &search).await?;
            for failure in &result.failures {
                ui::print_source_warning(&failure.source, &failure.error.to_string());
            }
            println!("{}", ui::render_papers(&result.papers, format));
        }

        Commands::Cite {
            source,
            paper_id,
            format: code,
        } => {
            let adapter = registry.get_required(&source)?;
            let citation = adapter
                .get_citation(&paper_id, CitationFormat::from_code(code))
                .await?;
            println!("{}", ui::render_citation(&citation, format));
        }

        Commands::Download {
            source,
            paper_id,
            dir,
            filename,
        } => {
            let adapter = registry.get_required(&source)?;
            let dirpath = dir.unwrap_or_else(|| config.downloads.default_path.clone());
            let mut request = DownloadRequest::new(paper_id, dirpath);
            if let Some(filename) = filename {
                request = request.filename(filename);
            }
            let path = adapter.download_paper(&request).await?;
            println!("saved {}", path.display());
        }

        Commands::Sources => {
            for id in registry.ids() {
                println!("{}", id);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // ApiError renders as "[source:reason] message"; context
            // added along the way chains on after it.
            ui::print_error(&format!("{:#}", error));
            ExitCode::FAILURE
        }
    }
}
