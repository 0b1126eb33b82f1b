//! EpiWatch Engine - the refresh pipeline and reconciliation rules.
//!
//! Provides:
//! - [`Fetch`] and the blocking [`HttpFetcher`] that pulls the status page
//! - The reconciliation state machine ([`reconcile`]) that maintains the
//!   one-latest-batch-per-scope invariant
//! - [`Ingestor`], the facade the server and CLI call

pub mod fetch;
pub mod ingest;
pub mod locks;
pub mod reconcile;

pub use fetch::{Fetch, HttpFetcher};
pub use ingest::Ingestor;
pub use reconcile::Action;
