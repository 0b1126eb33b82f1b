//! Domain model shared across parser, engine, and store.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Logical collection a record is persisted in. One table per collection,
/// identical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Worldwide per-country rows
    Global,
    /// Focus country's per-province rows
    CountryDetail,
    /// Per-city rows, keyed by the owning province in `parent`
    ProvinceDetail,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Global => "global",
            Collection::CountryDetail => "country_detail",
            Collection::ProvinceDetail => "province_detail",
        }
    }
}

/// A reconciliation scope: one independently maintained record partition.
///
/// The two flat scopes each own a whole collection; a province scope owns
/// the slice of the detail collection whose `parent` equals its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Country,
    Province(String),
}

impl Scope {
    pub fn collection(&self) -> Collection {
        match self {
            Scope::Global => Collection::Global,
            Scope::Country => Collection::CountryDetail,
            Scope::Province(_) => Collection::ProvinceDetail,
        }
    }

    /// Parent-region key for detail scopes
    pub fn parent(&self) -> Option<&str> {
        match self {
            Scope::Province(name) => Some(name),
            _ => None,
        }
    }

    /// Stable key used for per-scope serialization and logging
    pub fn key(&self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::Country => "country".to_string(),
            Scope::Province(name) => format!("province:{}", name),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One parsed data row: a region and its three counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub name: String,
    pub confirmed: u32,
    pub deaths: u32,
    pub recovered: u32,
}

/// The full set of rows parsed from one fetch, tagged with the publisher's
/// claimed update instant. Immutable after parse; discarded after
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Marker text (or province name) the rows were extracted under
    pub scope_label: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub rows: Vec<RawRow>,
}

/// A persisted per-region record.
///
/// `date`/`time` are the publisher's claimed update instant, never ingestion
/// wall clock. No uniqueness constraint backs these records; the engine
/// maintains the one-latest-batch-per-scope invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Owning province for detail records, `None` in flat collections
    pub parent: Option<String>,
    pub name: String,
    pub confirmed: u32,
    pub deaths: u32,
    pub recovered: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Marks the most recently ingested batch for the scope
    pub latest: bool,
}

impl StoredRecord {
    /// Build the persisted form of one snapshot row, tagged latest.
    pub fn from_row(
        row: &RawRow,
        parent: Option<&str>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            parent: parent.map(str::to_string),
            name: row.name.clone(),
            confirmed: row.confirmed,
            deaths: row.deaths,
            recovered: row.recovered,
            date,
            time,
            latest: true,
        }
    }
}
