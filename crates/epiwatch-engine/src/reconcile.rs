//! Reconciliation of a parsed snapshot against the stored state of a scope.
//!
//! Decision table, keyed on the publisher's claimed update instant:
//! - no record for the snapshot's date -> Insert
//! - a record for date AND time       -> NoOp
//! - a record for date, another time  -> Replace
//!
//! Writes happen in a fixed order so an interrupted refresh degrades
//! predictably: insert the new batch first, then demote stale latest rows
//! from other dates, then (Replace only) delete the superseded same-date
//! rows carrying the old time. At no point does the scope lose its data.

use epiwatch_core::model::{RawSnapshot, Scope, StoredRecord};
use epiwatch_core::Result;
use epiwatch_store::{DocumentStore, RecordFilter, RecordPatch};

/// What a refresh did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Snapshot already stored; nothing written
    NoOp,
    /// First batch for this date
    Insert(Vec<StoredRecord>),
    /// Same date re-published with a newer time; old batch superseded
    Replace(Vec<StoredRecord>),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::NoOp => "noop",
            Action::Insert(_) => "insert",
            Action::Replace(_) => "replace",
        }
    }

    /// Whether the store changed.
    pub fn updated(&self) -> bool {
        !matches!(self, Action::NoOp)
    }
}

/// Base filter selecting the scope's slice of its collection.
fn scope_filter(scope: &Scope) -> RecordFilter {
    match scope.parent() {
        Some(parent) => RecordFilter::new().with_parent(parent),
        None => RecordFilter::new(),
    }
}

/// Persisted form of the snapshot's rows, all tagged latest.
fn records_for(scope: &Scope, snapshot: &RawSnapshot) -> Vec<StoredRecord> {
    snapshot
        .rows
        .iter()
        .map(|row| StoredRecord::from_row(row, scope.parent(), snapshot.date, snapshot.time))
        .collect()
}

/// Classify the snapshot against what the scope already holds.
pub fn decide<S: DocumentStore>(
    store: &S,
    scope: &Scope,
    snapshot: &RawSnapshot,
) -> Result<Action> {
    let collection = scope.collection();
    let by_date = scope_filter(scope).with_date(snapshot.date);
    if store.find_one(collection, &by_date)?.is_none() {
        return Ok(Action::Insert(records_for(scope, snapshot)));
    }
    let by_instant = by_date.with_time(snapshot.time);
    if store.find_one(collection, &by_instant)?.is_some() {
        return Ok(Action::NoOp);
    }
    Ok(Action::Replace(records_for(scope, snapshot)))
}

/// Execute the decided action in the fixed write order.
pub fn apply<S: DocumentStore>(
    store: &mut S,
    scope: &Scope,
    snapshot: &RawSnapshot,
    action: &Action,
) -> Result<()> {
    let collection = scope.collection();
    match action {
        Action::NoOp => Ok(()),
        Action::Insert(records) => {
            let inserted = store.insert_many(collection, records)?;
            let demoted = demote_stale_latest(store, scope, snapshot)?;
            tracing::debug!(
                scope = %scope,
                inserted,
                demoted,
                "insert applied"
            );
            Ok(())
        }
        Action::Replace(records) => {
            let inserted = store.insert_many(collection, records)?;
            let demoted = demote_stale_latest(store, scope, snapshot)?;
            let superseded = scope_filter(scope)
                .with_date(snapshot.date)
                .with_time_ne(snapshot.time);
            let deleted = store.delete_many(collection, &superseded)?;
            tracing::debug!(
                scope = %scope,
                inserted,
                demoted,
                deleted,
                "replace applied"
            );
            Ok(())
        }
    }
}

/// Clear the latest flag on every batch of the scope except the snapshot's
/// own date. The date guard keeps the freshly inserted rows untouched.
fn demote_stale_latest<S: DocumentStore>(
    store: &mut S,
    scope: &Scope,
    snapshot: &RawSnapshot,
) -> Result<usize> {
    let stale = scope_filter(scope)
        .with_latest(true)
        .with_date_ne(snapshot.date);
    store.update_many(scope.collection(), &stale, &RecordPatch::set_latest(false))
}

/// Decide and apply in one step; returns what was done.
pub fn reconcile<S: DocumentStore>(
    store: &mut S,
    scope: &Scope,
    snapshot: &RawSnapshot,
) -> Result<Action> {
    let action = decide(store, scope, snapshot)?;
    apply(store, scope, snapshot, &action)?;
    Ok(action)
}
