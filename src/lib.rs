//! # iwadi
//!
//! Search, cite, and download academic papers from multiple research
//! sources through one normalized interface.
//!
//! ## Architecture
//!
//! - [`models`]: normalized Paper/Citation data model and query types
//! - [`error`]: the shared error taxonomy every source raises through
//! - [`sources`]: one adapter per backend behind the [`Source`] trait,
//!   plus the [`SourceRegistry`] multi-source fan-out
//! - [`utils`]: HTTP plumbing and citation rendering
//! - [`config`]: environment-backed configuration
//! - [`ui`]: terminal rendering for the CLI

pub mod config;
pub mod error;
pub mod models;
pub mod sources;
pub mod ui;
pub mod utils;

pub use error::{ApiError, ErrorDetail};
pub use models::{Citation, CitationFormat, Paper, SearchQuery};
pub use sources::{Source, SourceRegistry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
