//! Canonical error taxonomy for the ingestion pipeline.
//!
//! Every failure mode crossing a component boundary is one of these kinds.
//! Expected kinds (the publisher has not posted today, the page changed
//! shape, the site is down) reduce to a `false` result at the facade;
//! store failures also reduce to `false` but can leave a partial write-set
//! behind, so they are logged at error level instead of warn.

use thiserror::Error;

/// Result type alias using IngestError
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error taxonomy for fetch, parse, and persistence failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Page fetch failed: transport error, timeout, or non-200 status
    #[error("connect failure: {reason}")]
    ConnectFailure { reason: String },

    /// The expected section title is absent; the publisher has not posted
    /// data for this scope yet
    #[error("no data available for scope '{scope}'")]
    NoDataAvailable { scope: String },

    /// The requested province has no heading on the page
    #[error("unknown region: {region}")]
    UnknownRegion { region: String },

    /// Update date or time pattern missing from the title's sibling field
    #[error("malformed update timestamp: {reason}")]
    MalformedTimestamp { reason: String },

    /// A data row is structurally broken; the whole snapshot is rejected
    #[error("malformed row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },

    /// The store could not be opened or read
    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// The store rejected a write mid-action; partial writes are possible
    #[error("write rejected during {op}: {reason}")]
    WriteRejected { op: String, reason: String },

    /// Configuration file missing or unparsable
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl IngestError {
    /// Stable code for programmatic handling and log grouping
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::ConnectFailure { .. } => "ERR_CONNECT_FAILURE",
            IngestError::NoDataAvailable { .. } => "ERR_NO_DATA_AVAILABLE",
            IngestError::UnknownRegion { .. } => "ERR_UNKNOWN_REGION",
            IngestError::MalformedTimestamp { .. } => "ERR_MALFORMED_TIMESTAMP",
            IngestError::MalformedRow { .. } => "ERR_MALFORMED_ROW",
            IngestError::StoreUnavailable { .. } => "ERR_STORE_UNAVAILABLE",
            IngestError::WriteRejected { .. } => "ERR_WRITE_REJECTED",
            IngestError::InvalidConfig { .. } => "ERR_INVALID_CONFIG",
        }
    }

    /// Whether this is an expected, retry-later condition (fetch/parse side)
    /// rather than an infrastructure failure
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            IngestError::ConnectFailure { .. }
                | IngestError::NoDataAvailable { .. }
                | IngestError::UnknownRegion { .. }
                | IngestError::MalformedTimestamp { .. }
                | IngestError::MalformedRow { .. }
        )
    }
}
