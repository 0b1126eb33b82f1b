//! Per-scope serialization.
//!
//! Refreshes of the same scope must not interleave; refreshes of different
//! scopes may. Each scope key gets its own mutex, handed out as an `Arc`
//! so the registry lock is held only for the lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use epiwatch_core::model::Scope;

#[derive(Default)]
pub struct ScopeLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `scope`. Callers lock the returned handle for the
    /// duration of one refresh.
    ///
    /// Idle entries are dropped on each lookup, so unknown province names
    /// cannot grow the registry without bound.
    pub fn slot(&self, scope: &Scope) -> Arc<Mutex<()>> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // strong_count 1 means only the registry holds the slot
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(scope.key()).or_default().clone()
    }
}
