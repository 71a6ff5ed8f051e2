//! The canonical trip store.
//!
//! One SQLite database holding a single `trips` table with a fixed schema.
//! Both ingestion paths (per-dataset staging and multi-store merge) write
//! into it through projections built from [`SOURCE_CORRESPONDENCE`].

use std::{fs, path::Path};

use itertools::Itertools;
use log::debug;
use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

pub const TRIPS_TABLE: &str = "trips";

/// Canonical columns and their declared types, in table order.
pub const CANONICAL_COLUMNS: &[(&str, &str)] = &[
    ("vendor_id", "INTEGER"),
    ("pickup_datetime", "TIMESTAMP"),
    ("dropoff_datetime", "TIMESTAMP"),
    ("passenger_count", "INTEGER"),
    ("trip_distance", "DOUBLE"),
    ("rate_code_id", "INTEGER"),
    ("pu_location_id", "INTEGER"),
    ("do_location_id", "INTEGER"),
    ("payment_type", "INTEGER"),
    ("fare_amount", "DOUBLE"),
    ("extra", "DOUBLE"),
    ("mta_tax", "DOUBLE"),
    ("tip_amount", "DOUBLE"),
    ("tolls_amount", "DOUBLE"),
    ("improvement_surcharge", "DOUBLE"),
    ("total_amount", "DOUBLE"),
    ("congestion_surcharge", "DOUBLE"),
    ("taxi_type", "VARCHAR"),
];

/// Canonical column -> source column for every field that is copied by
/// name. Timestamps and the taxi type label are mapped per dialect.
pub const SOURCE_CORRESPONDENCE: &[(&str, &str)] = &[
    ("vendor_id", "VendorID"),
    ("passenger_count", "passenger_count"),
    ("trip_distance", "trip_distance"),
    ("rate_code_id", "RatecodeID"),
    ("pu_location_id", "PULocationID"),
    ("do_location_id", "DOLocationID"),
    ("payment_type", "payment_type"),
    ("fare_amount", "fare_amount"),
    ("extra", "extra"),
    ("mta_tax", "mta_tax"),
    ("tip_amount", "tip_amount"),
    ("tolls_amount", "tolls_amount"),
    ("improvement_surcharge", "improvement_surcharge"),
    ("total_amount", "total_amount"),
    ("congestion_surcharge", "congestion_surcharge"),
];

pub struct TripStore {
    conn: Connection,
}

impl TripStore {
    /// Opens (or creates) a store, adding the `trips` table when missing.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an existing store for querying. Nothing is created or written.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Rebuilds a store from scratch at `path`, replacing any existing file.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            debug!("Removing existing store {path:?}");
            fs::remove_file(path)?;
        }
        Self::open(path)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn trip_count(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {TRIPS_TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn apply_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(&create_trips_table_sql())?;
        Ok(())
    }
}

pub fn create_trips_table_sql() -> String {
    let columns = CANONICAL_COLUMNS
        .iter()
        .map(|(name, sql_type)| format!("{name} {sql_type}"))
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {TRIPS_TABLE} ({columns})")
}

/// Column names of `schema.table`, in declaration order. Empty when the
/// table does not exist.
pub fn table_columns(conn: &Connection, schema: &str, table: &str) -> Result<Vec<String>> {
    let sql = format!(
        "PRAGMA {}.table_info({})",
        quote_ident(schema),
        quote_ident(table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite resolves identifiers case-insensitively, so presence checks do too.
pub fn has_column(columns: &[String], name: &str) -> bool {
    columns.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// Select-list expression for a copied-by-name field: the quoted source
/// column when present, then the canonical column (stores written by an
/// earlier run), otherwise `NULL`.
pub(crate) fn source_expression(
    columns: &[String],
    qualifier: Option<&str>,
    canonical: &str,
    source: &str,
) -> String {
    let Some(found) = [source, canonical]
        .into_iter()
        .find(|name| has_column(columns, name))
    else {
        debug!("Source column '{source}' not present; projecting NULL");
        return "NULL".to_string();
    };
    match qualifier {
        Some(q) => format!("{}.{}", q, quote_ident(found)),
        None => quote_ident(found),
    }
}

/// `INSERT INTO trips (...)` prefix with an explicit target list matching
/// the select lists built by the ingest and merge projections.
pub(crate) fn insert_prefix() -> String {
    let targets = SOURCE_CORRESPONDENCE
        .iter()
        .map(|(canonical, _)| *canonical)
        .chain(["pickup_datetime", "dropoff_datetime", "taxi_type"])
        .join(", ");
    format!("INSERT INTO {TRIPS_TABLE} ({targets})")
}
