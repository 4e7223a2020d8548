//! Configuration management.
//!
//! Built once at process start and handed to adapter constructors; no
//! module-level singletons.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration with environment-backed defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API keys for external services.
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Download settings.
    #[serde(default)]
    pub downloads: DownloadConfig,
}

impl Config {
    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// API keys for external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// IEEE Xplore API key; required to construct the IEEE adapter.
    #[serde(default)]
    pub ieee: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            ieee: std::env::var("IEEE_API_KEY").ok(),
        }
    }
}

/// Download configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Default directory for saved PDFs.
    #[serde(default = "default_download_dir")]
    pub default_path: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_path: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}
