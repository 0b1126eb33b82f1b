//! Filter and patch types for document-store queries.
//!
//! A filter is a conjunction of field conditions: equality on
//! parent/date/time/latest plus the not-equal forms on date and time that
//! the engine's write-set needs to exclude freshly inserted rows.

use chrono::{NaiveDate, NaiveTime};

/// Conjunctive record filter. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub parent: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub latest: Option<bool>,
    pub date_ne: Option<NaiveDate>,
    pub time_ne: Option<NaiveTime>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_latest(mut self, latest: bool) -> Self {
        self.latest = Some(latest);
        self
    }

    pub fn with_date_ne(mut self, date: NaiveDate) -> Self {
        self.date_ne = Some(date);
        self
    }

    pub fn with_time_ne(mut self, time: NaiveTime) -> Self {
        self.time_ne = Some(time);
        self
    }
}

/// Fields settable by `update_many`. Only the latest flag ever transitions
/// in place; everything else is replaced wholesale by delete-and-insert.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub latest: Option<bool>,
}

impl RecordPatch {
    pub fn set_latest(latest: bool) -> Self {
        Self {
            latest: Some(latest),
        }
    }
}
