//! EpiWatch Core - shared domain model, errors, config, and logging
//!
//! Provides:
//! - Domain types (`RawSnapshot`, `StoredRecord`, `Scope`, `Collection`)
//! - Canonical error taxonomy (`IngestError`)
//! - TOML-backed service configuration
//! - Logging initialization

pub mod config;
pub mod errors;
pub mod logging;
pub mod model;

// Re-export key types
pub use errors::{IngestError, Result};
