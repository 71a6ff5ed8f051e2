//! Per-dataset ingestion into the canonical store.
//!
//! A dataset is staged verbatim into a TEMP table, its column list is run
//! through [`normalize::detect_columns`], and when a dialect is recognized
//! one `INSERT ... SELECT` copies the staged rows into `trips`. Datasets
//! without a recognized dialect are skipped. The staging table is dropped
//! on every exit path.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};
use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
    error::Result,
    io_utils,
    normalize::{self, ColumnMapping, TaxiType},
    store::{self, SOURCE_CORRESPONDENCE, TripStore, quote_ident},
};

pub const STAGING_TABLE: &str = "staging_trips";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A tabular source read once, front to back.
pub trait SourceDataset {
    /// Label used in log lines.
    fn name(&self) -> String;
    fn headers(&self) -> &[String];
    fn next_row(&mut self) -> Result<Option<Vec<String>>>;
}

#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
}

pub struct CsvDataset {
    path: PathBuf,
    reader: csv::Reader<Box<dyn Read>>,
    headers: Vec<String>,
    encoding: &'static Encoding,
    record: csv::ByteRecord,
}

impl CsvDataset {
    pub fn open(path: &Path, options: &CsvOptions) -> Result<Self> {
        let encoding = io_utils::resolve_encoding(options.encoding.as_deref())?;
        Self::open_with_encoding(path, options.delimiter, encoding)
    }

    fn open_with_encoding(
        path: &Path,
        delimiter: Option<u8>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            encoding,
            record: csv::ByteRecord::new(),
        })
    }
}

impl SourceDataset for CsvDataset {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }
        io_utils::decode_record(&self.record, self.encoding).map(Some)
    }
}

/// Rows held in memory; short rows read as NULL in the missing cells.
pub struct InMemoryDataset {
    name: String,
    headers: Vec<String>,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl InMemoryDataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: rows.into_iter(),
        }
    }
}

impl SourceDataset for InMemoryDataset {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        Ok(self.rows.next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Merged { taxi_type: TaxiType, rows: usize },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub path: PathBuf,
    pub outcome: IngestOutcome,
}

/// Temporary per-dataset relation, dropped when the guard goes out of scope.
struct StagingTable<'a> {
    conn: &'a Connection,
}

impl<'a> StagingTable<'a> {
    fn create(conn: &'a Connection, headers: &[String]) -> Result<Self> {
        let columns = staging_names(headers).iter().map(|h| quote_ident(h)).join(", ");
        conn.execute_batch(&format!("CREATE TEMP TABLE {STAGING_TABLE} ({columns})"))?;
        Ok(Self { conn })
    }

    fn load(&self, dataset: &mut dyn SourceDataset) -> Result<usize> {
        let width = dataset.headers().len();
        let placeholders = (1..=width).map(|idx| format!("?{idx}")).join(", ");
        let tx = self.conn.unchecked_transaction()?;
        let mut loaded = 0usize;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO temp.{STAGING_TABLE} VALUES ({placeholders})"))?;
            while let Some(row) = dataset.next_row()? {
                let values = (0..width).map(|idx| match row.get(idx) {
                    Some(raw) => stage_value(raw),
                    None => Value::Null,
                });
                stmt.execute(params_from_iter(values))?;
                loaded += 1;
            }
        }
        tx.commit()?;
        Ok(loaded)
    }

    fn columns(&self) -> Result<Vec<String>> {
        store::table_columns(self.conn, "temp", STAGING_TABLE)
    }
}

impl Drop for StagingTable<'_> {
    fn drop(&mut self) {
        if let Err(err) = self
            .conn
            .execute_batch(&format!("DROP TABLE IF EXISTS temp.{STAGING_TABLE}"))
        {
            warn!("Failed to drop staging table: {err}");
        }
    }
}

/// Stages one dataset and copies it into `trips` when its dialect is known.
pub fn ingest(store: &TripStore, dataset: &mut dyn SourceDataset) -> Result<IngestOutcome> {
    let conn = store.connection();
    let name = dataset.name();
    if normalize::detect_columns(dataset.headers()).taxi_type.is_none() {
        info!("Skipping {name}: no recognized pickup column");
        return Ok(IngestOutcome::Skipped);
    }
    let staging = StagingTable::create(conn, dataset.headers())?;
    let staged = staging.load(dataset)?;
    let columns = staging.columns()?;
    let mapping = normalize::detect_columns(&columns);
    debug!("Column mapping for {name}: {mapping:?}");

    let Some(taxi_type) = mapping.taxi_type else {
        info!("Skipping {name}: no recognized pickup column");
        return Ok(IngestOutcome::Skipped);
    };

    let sql = projection_sql(&mapping, taxi_type, &columns);
    debug!("Projection for {name}: {sql}");
    let rows = conn.execute(&sql, [])?;
    info!("✓ Merged {rows} of {staged} staged row(s) from {name} as {taxi_type}");
    Ok(IngestOutcome::Merged { taxi_type, rows })
}

/// Ingests CSV/TSV files in order. The first failing file aborts the run.
pub fn ingest_paths(
    store: &TripStore,
    paths: &[PathBuf],
    options: &CsvOptions,
) -> Result<Vec<IngestReport>> {
    let encoding = io_utils::resolve_encoding(options.encoding.as_deref())?;
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let mut dataset = CsvDataset::open_with_encoding(path, options.delimiter, encoding)?;
        let outcome = ingest(store, &mut dataset)?;
        reports.push(IngestReport {
            path: path.clone(),
            outcome,
        });
    }
    Ok(reports)
}

fn projection_sql(mapping: &ColumnMapping, taxi_type: TaxiType, columns: &[String]) -> String {
    let mut select = SOURCE_CORRESPONDENCE
        .iter()
        .map(|(canonical, source)| {
            format!(
                "{} AS {canonical}",
                store::source_expression(columns, None, canonical, source)
            )
        })
        .collect::<Vec<_>>();
    let timestamp = |column: &Option<String>| {
        column
            .as_deref()
            .map(quote_ident)
            .unwrap_or_else(|| "NULL".to_string())
    };
    select.push(format!("{} AS pickup_datetime", timestamp(&mapping.pickup_column)));
    select.push(format!("{} AS dropoff_datetime", timestamp(&mapping.dropoff_column)));
    select.push(format!("'{}' AS taxi_type", taxi_type.label()));
    format!(
        "{} SELECT {} FROM temp.{STAGING_TABLE}",
        store::insert_prefix(),
        select.join(", ")
    )
}

/// Staging column names: blank headers get a positional name and repeats
/// (compared case-insensitively) get a numeric suffix.
fn staging_names(headers: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header.clone()
        };
        let mut candidate = base.clone();
        let mut suffix = 2;
        while store::has_column(&names, &candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

/// Typed staging value for one raw cell.
fn stage_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Integer(int);
    }
    if let Some(float) = trimmed.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return Value::Real(float);
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Value::Text(parsed.format(CANONICAL_DATETIME_FORMAT).to_string());
        }
    }
    Value::Text(raw.to_string())
}
