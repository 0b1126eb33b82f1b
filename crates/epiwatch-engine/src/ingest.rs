//! Refresh facade
//!
//! Ties fetch, parse, and reconcile together behind the three public
//! refresh operations. Each returns a bare bool: true when the pass
//! completed (a no-op because the publisher has not re-posted is still a
//! success), false on any failure. Failures never propagate out of the
//! bool surface; they are logged here instead.

use std::sync::Mutex;

use epiwatch_core::config::IngestConfig;
use epiwatch_core::model::Scope;
use epiwatch_core::Result;
use epiwatch_parser::PageDocument;
use epiwatch_store::DocumentStore;

use crate::fetch::Fetch;
use crate::locks::ScopeLocks;
use crate::reconcile::{reconcile, Action};

/// The refresh pipeline for one store and one page source.
pub struct Ingestor<S, F> {
    store: Mutex<S>,
    fetcher: F,
    config: IngestConfig,
    locks: ScopeLocks,
}

impl<S: DocumentStore, F: Fetch> Ingestor<S, F> {
    pub fn new(store: S, fetcher: F, config: IngestConfig) -> Self {
        Self {
            store: Mutex::new(store),
            fetcher,
            config,
            locks: ScopeLocks::new(),
        }
    }

    /// Refresh the worldwide per-country listing.
    pub fn refresh_global(&self) -> bool {
        self.refresh(&Scope::Global).is_some()
    }

    /// Refresh the focus country's per-province listing.
    pub fn refresh_country(&self) -> bool {
        self.refresh(&Scope::Country).is_some()
    }

    /// Refresh one province's per-city listing.
    pub fn refresh_province(&self, name: &str) -> bool {
        self.refresh(&Scope::Province(name.to_string())).is_some()
    }

    /// Run one logged refresh pass. `Some` carries what the pass did,
    /// `NoOp` included; `None` means the pass failed.
    pub fn refresh(&self, scope: &Scope) -> Option<Action> {
        match self.try_refresh(scope) {
            Ok(action) => {
                tracing::info!(scope = %scope, action = action.label(), "refresh complete");
                Some(action)
            }
            Err(err) if err.is_expected() => {
                tracing::warn!(scope = %scope, code = err.code(), error = %err, "refresh skipped");
                None
            }
            Err(err) => {
                tracing::error!(scope = %scope, code = err.code(), error = %err, "refresh failed");
                None
            }
        }
    }

    /// The fallible pipeline: fetch, parse the scope's section, reconcile.
    ///
    /// Refreshes of the same scope are serialized; the store mutex is taken
    /// only for the reconcile step, after fetch and parse are done.
    pub fn try_refresh(&self, scope: &Scope) -> Result<Action> {
        let slot = self.locks.slot(scope);
        let _serialized = slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let body = self.fetcher.fetch_page()?;
        let page = PageDocument::parse(&body);
        let snapshot = match scope {
            Scope::Global => page.snapshot(&self.config.global_marker, None)?,
            Scope::Country => page.snapshot(
                &self.config.country_marker,
                Some(self.config.country_row_limit),
            )?,
            Scope::Province(name) => {
                page.province_snapshot(&self.config.country_marker, name)?
            }
        };
        tracing::debug!(
            scope = %scope,
            date = %snapshot.date,
            time = %snapshot.time,
            rows = snapshot.rows.len(),
            "snapshot parsed"
        );

        let mut store = self
            .store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        reconcile(&mut *store, scope, &snapshot)
    }

    /// Direct store access for inspection.
    pub fn store(&self) -> &Mutex<S> {
        &self.store
    }
}
