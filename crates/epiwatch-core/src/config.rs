//! Service configuration
//!
//! TOML-backed; every field has a default so an empty file (or no file at
//! all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{IngestError, Result};

/// Fetch-and-parse settings for the status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Status page to fetch
    pub source_url: String,
    /// User-Agent sent with the fetch; the publisher rejects bare clients
    pub user_agent: String,
    /// Section title marking the global listing
    pub global_marker: String,
    /// Section title marking the focus-country listing
    pub country_marker: String,
    /// Row count of the country listing; the global listing is unbounded
    pub country_row_limit: usize,
    /// Bound on the page fetch; elapsing counts as a connect failure
    pub fetch_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_url: "http://m.sinovision.net/newpneumonia.php".to_string(),
            user_agent: "Mozilla5.0".to_string(),
            global_marker: "全球疫情".to_string(),
            country_marker: "中国疫情".to_string(),
            country_row_limit: 34,
            fetch_timeout_secs: 15,
        }
    }
}

/// Full service configuration: HTTP surface, store location, ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP surface binds
    pub listen_addr: String,
    /// SQLite database file
    pub db_path: PathBuf,
    pub ingest: IngestConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9090".to_string(),
            db_path: PathBuf::from("epiwatch.db"),
            ingest: IngestConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| IngestError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e),
        })?;
        toml::from_str(&raw).map_err(|e| IngestError::InvalidConfig {
            reason: e.to_string(),
        })
    }
}
