//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use std::path::Path;

use epiwatch_core::{IngestError, Result};
use rusqlite::Connection;

/// Map a read-side failure
pub(crate) fn store_unavailable(err: rusqlite::Error) -> IngestError {
    IngestError::StoreUnavailable {
        reason: err.to_string(),
    }
}

/// Map a write-side failure, tagged with the rejected operation
pub(crate) fn write_rejected(op: &str, err: rusqlite::Error) -> IngestError {
    IngestError::WriteRejected {
        op: op.to_string(),
        reason: err.to_string(),
    }
}

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(store_unavailable)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(store_unavailable)
}

/// Configure a connection with sensible settings
pub fn configure(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked while an ingestion writes
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(store_unavailable)?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(store_unavailable)?;
    Ok(())
}
