//! Page fetching
//!
//! One small trait so the pipeline can be driven by canned bodies in tests,
//! and a blocking reqwest implementation for production.

use std::time::Duration;

use epiwatch_core::config::IngestConfig;
use epiwatch_core::{IngestError, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

/// Source of the raw status-page body.
pub trait Fetch: Send + Sync {
    /// Fetch the page body. Any transport-level failure, non-success status,
    /// or timeout surfaces as `ConnectFailure`.
    fn fetch_page(&self) -> Result<String>;
}

/// Blocking HTTP fetcher for the configured status page.
pub struct HttpFetcher {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| IngestError::ConnectFailure {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: config.source_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .map_err(|e| IngestError::ConnectFailure {
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ConnectFailure {
                reason: format!("unexpected status {status}"),
            });
        }
        response.text().map_err(|e| IngestError::ConnectFailure {
            reason: e.to_string(),
        })
    }
}
