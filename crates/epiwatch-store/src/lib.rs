//! EpiWatch Store - generic document-store operations over SQLite
//!
//! Provides:
//! - The [`DocumentStore`] trait the reconciliation engine depends on
//! - A SQLite implementation with one table per logical collection
//! - Connection management helpers
//!
//! No business logic lives here; the engine owns the reconciliation rules
//! and the latest-flag invariant.

pub mod db;
pub mod filter;
pub mod sqlite;

pub use filter::{RecordFilter, RecordPatch};
pub use sqlite::SqliteStore;

use epiwatch_core::model::{Collection, StoredRecord};
use epiwatch_core::Result;

/// Generic document-store capability: filter-match reads and batched writes.
///
/// Read failures surface as `StoreUnavailable`, write failures as
/// `WriteRejected`; nothing is retried or wrapped in a transaction here.
pub trait DocumentStore {
    /// Return any one record matching the filter.
    fn find_one(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Option<StoredRecord>>;

    /// Set fields on every record matching the filter; returns the count
    /// touched.
    fn update_many(
        &mut self,
        collection: Collection,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Result<usize>;

    /// Insert a batch of records; returns the count inserted.
    fn insert_many(&mut self, collection: Collection, records: &[StoredRecord]) -> Result<usize>;

    /// Delete every record matching the filter; returns the count removed.
    fn delete_many(&mut self, collection: Collection, filter: &RecordFilter) -> Result<usize>;
}
