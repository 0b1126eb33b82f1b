//! SQLite implementation of the document store.
//!
//! One table per logical collection, identical shape. Uniqueness of the
//! current batch per (scope, date) is deliberately NOT enforced by the
//! schema; the engine maintains it.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use epiwatch_core::model::{Collection, StoredRecord};
use epiwatch_core::{IngestError, Result};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension};

use crate::db::{self, store_unavailable, write_rejected};
use crate::filter::{RecordFilter, RecordPatch};
use crate::DocumentStore;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

const ALL_COLLECTIONS: [Collection; 3] = [
    Collection::Global,
    Collection::CountryDetail,
    Collection::ProvinceDetail,
];

/// SQLite-backed document store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        for collection in ALL_COLLECTIONS {
            let table = collection.table_name();
            self.conn
                .execute_batch(&format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        parent TEXT,
                        name TEXT NOT NULL,
                        confirmed INTEGER NOT NULL,
                        deaths INTEGER NOT NULL,
                        recovered INTEGER NOT NULL,
                        date TEXT NOT NULL,
                        time TEXT NOT NULL,
                        latest INTEGER NOT NULL DEFAULT 0
                    );
                    CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table} (date);
                    CREATE INDEX IF NOT EXISTS idx_{table}_latest ON {table} (latest);"
                ))
                .map_err(store_unavailable)?;
        }
        Ok(())
    }

    /// Row count matching a filter. Not part of the generic capability;
    /// used by operational checks and tests.
    pub fn count(&self, collection: Collection, filter: &RecordFilter) -> Result<usize> {
        let (clause, params) = where_clause(filter);
        let sql = format!(
            "SELECT COUNT(*) FROM {} {}",
            collection.table_name(),
            clause
        );
        self.conn
            .query_row(
                &sql,
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as usize)
            .map_err(store_unavailable)
    }
}

impl DocumentStore for SqliteStore {
    fn find_one(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Option<StoredRecord>> {
        let (clause, params) = where_clause(filter);
        let sql = format!(
            "SELECT parent, name, confirmed, deaths, recovered, date, time, latest
             FROM {} {} LIMIT 1",
            collection.table_name(),
            clause
        );
        let raw = self
            .conn
            .query_row(
                &sql,
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                |row| {
                    Ok(RawStoredRow {
                        parent: row.get(0)?,
                        name: row.get(1)?,
                        confirmed: row.get(2)?,
                        deaths: row.get(3)?,
                        recovered: row.get(4)?,
                        date: row.get(5)?,
                        time: row.get(6)?,
                        latest: row.get::<_, i64>(7)? != 0,
                    })
                },
            )
            .optional()
            .map_err(store_unavailable)?;
        raw.map(RawStoredRow::into_record).transpose()
    }

    fn update_many(
        &mut self,
        collection: Collection,
        filter: &RecordFilter,
        patch: &RecordPatch,
    ) -> Result<usize> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(latest) = patch.latest {
            sets.push("latest = ?");
            params.push(Box::new(latest));
        }
        if sets.is_empty() {
            return Ok(0);
        }
        let (clause, where_params) = where_clause(filter);
        params.extend(where_params);
        let sql = format!(
            "UPDATE {} SET {} {}",
            collection.table_name(),
            sets.join(", "),
            clause
        );
        self.conn
            .execute(
                &sql,
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            )
            .map_err(|e| write_rejected("update_many", e))
    }

    fn insert_many(&mut self, collection: Collection, records: &[StoredRecord]) -> Result<usize> {
        let sql = format!(
            "INSERT INTO {} (parent, name, confirmed, deaths, recovered, date, time, latest)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            collection.table_name()
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| write_rejected("insert_many", e))?;
        for record in records {
            stmt.execute(rusqlite::params![
                record.parent,
                record.name,
                record.confirmed,
                record.deaths,
                record.recovered,
                record.date.format(DATE_FMT).to_string(),
                record.time.format(TIME_FMT).to_string(),
                record.latest,
            ])
            .map_err(|e| write_rejected("insert_many", e))?;
        }
        Ok(records.len())
    }

    fn delete_many(&mut self, collection: Collection, filter: &RecordFilter) -> Result<usize> {
        let (clause, params) = where_clause(filter);
        let sql = format!("DELETE FROM {} {}", collection.table_name(), clause);
        self.conn
            .execute(
                &sql,
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            )
            .map_err(|e| write_rejected("delete_many", e))
    }
}

/// Intermediate row shape; date/time are re-validated outside the rusqlite
/// error domain.
struct RawStoredRow {
    parent: Option<String>,
    name: String,
    confirmed: u32,
    deaths: u32,
    recovered: u32,
    date: String,
    time: String,
    latest: bool,
}

impl RawStoredRow {
    fn into_record(self) -> Result<StoredRecord> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FMT).map_err(|e| {
            IngestError::StoreUnavailable {
                reason: format!("corrupt date '{}': {}", self.date, e),
            }
        })?;
        let time = NaiveTime::parse_from_str(&self.time, TIME_FMT).map_err(|e| {
            IngestError::StoreUnavailable {
                reason: format!("corrupt time '{}': {}", self.time, e),
            }
        })?;
        Ok(StoredRecord {
            parent: self.parent,
            name: self.name,
            confirmed: self.confirmed,
            deaths: self.deaths,
            recovered: self.recovered,
            date,
            time,
            latest: self.latest,
        })
    }
}

fn where_clause(filter: &RecordFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conds: Vec<&'static str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();
    if let Some(parent) = &filter.parent {
        conds.push("parent = ?");
        params.push(Box::new(parent.clone()));
    }
    if let Some(date) = filter.date {
        conds.push("date = ?");
        params.push(Box::new(date.format(DATE_FMT).to_string()));
    }
    if let Some(time) = filter.time {
        conds.push("time = ?");
        params.push(Box::new(time.format(TIME_FMT).to_string()));
    }
    if let Some(latest) = filter.latest {
        conds.push("latest = ?");
        params.push(Box::new(latest));
    }
    if let Some(date) = filter.date_ne {
        conds.push("date <> ?");
        params.push(Box::new(date.format(DATE_FMT).to_string()));
    }
    if let Some(time) = filter.time_ne {
        conds.push("time <> ?");
        params.push(Box::new(time.format(TIME_FMT).to_string()));
    }
    if conds.is_empty() {
        (String::new(), params)
    } else {
        (format!("WHERE {}", conds.join(" AND ")), params)
    }
}
