//! Combines per-source SQLite stores into one canonical store.
//!
//! Each source holds a raw `trips` table that may carry both dialects'
//! timestamp columns. Sources are attached one at a time under an alias
//! derived from their path, normalized into `trips` with a row-level
//! dialect check, and detached again.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::{
    error::{Result, TripError},
    normalize::{
        GREEN_DROPOFF_COLUMN, GREEN_PICKUP_COLUMN, TaxiType, YELLOW_DROPOFF_COLUMN,
        YELLOW_PICKUP_COLUMN,
    },
    store::{self, SOURCE_CORRESPONDENCE, TRIPS_TABLE, TripStore, quote_ident},
};

/// Table alias for the attached `trips` table inside the merge statement.
const SOURCE_ROWS: &str = "source_rows";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSource {
    pub path: PathBuf,
    pub alias: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub sources: Vec<MergedSource>,
}

impl MergeSummary {
    pub fn total_rows(&self) -> usize {
        self.sources.iter().map(|s| s.rows).sum()
    }
}

/// Alias for the `index`-th source of a run: the index keeps aliases
/// distinct within the run, the digest ties them to the source path.
pub fn attach_alias(index: usize, path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    let hex = format!("{digest:x}");
    format!("src{index}_{}", &hex[..12])
}

struct AttachedSource<'a> {
    conn: &'a Connection,
    alias: String,
}

impl<'a> AttachedSource<'a> {
    /// Attaches `path` read-only. Missing files are an error rather than
    /// an empty database.
    fn attach(conn: &'a Connection, path: &Path, alias: String) -> Result<Self> {
        if !path.is_file() {
            return Err(TripError::SourceNotFound(path.to_path_buf()));
        }
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", quote_ident(&alias)),
            [read_only_uri(path)],
        )?;
        Ok(Self { conn, alias })
    }
}

/// `file:` URI opening `path` in read-only mode.
fn read_only_uri(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    format!("file:{escaped}?mode=ro")
}

impl Drop for AttachedSource<'_> {
    fn drop(&mut self) {
        if let Err(err) = self
            .conn
            .execute_batch(&format!("DETACH DATABASE {}", quote_ident(&self.alias)))
        {
            warn!("Failed to detach {}: {err}", self.alias);
        }
    }
}

/// Merges every source into `store`. Any failure aborts the run; sources
/// merged before the failure stay in the store.
pub fn merge_sources(store: &TripStore, sources: &[PathBuf]) -> Result<MergeSummary> {
    let conn = store.connection();
    let mut summary = MergeSummary::default();
    for (index, path) in sources.iter().enumerate() {
        let alias = attach_alias(index, path);
        info!("Attaching {path:?} as {alias}");
        let attached = AttachedSource::attach(conn, path, alias.clone())?;

        let columns = store::table_columns(conn, &attached.alias, TRIPS_TABLE)?;
        if columns.is_empty() {
            return Err(TripError::MissingSourceTable(path.clone()));
        }

        let rows = match merge_sql(&attached.alias, &columns) {
            Some(sql) => {
                debug!("Merge projection for {alias}: {sql}");
                conn.execute(&sql, [])?
            }
            None => {
                info!("{path:?} declares no pickup column; nothing to merge");
                0
            }
        };
        drop(attached);
        info!("✓ Merged {rows} row(s) from {path:?}");
        summary.sources.push(MergedSource {
            path: path.clone(),
            alias,
            rows,
        });
    }
    Ok(summary)
}

/// Normalize-and-copy statement for an attached source, or `None` when the
/// source declares neither dialect's pickup column.
fn merge_sql(alias: &str, columns: &[String]) -> Option<String> {
    let qualified = |name: &str| format!("{SOURCE_ROWS}.{}", quote_ident(name));
    let present = |names: [&'static str; 2]| {
        names
            .into_iter()
            .filter(|name| store::has_column(columns, name))
            .collect::<Vec<_>>()
    };
    let coalesce = |names: &[&str]| match names {
        [] => "NULL".to_string(),
        [single] => qualified(*single),
        many => format!(
            "COALESCE({})",
            many.iter().map(|&n| qualified(n)).collect::<Vec<_>>().join(", ")
        ),
    };

    let pickups = present([YELLOW_PICKUP_COLUMN, GREEN_PICKUP_COLUMN]);
    if pickups.is_empty() {
        return None;
    }
    let dropoffs = present([YELLOW_DROPOFF_COLUMN, GREEN_DROPOFF_COLUMN]);
    let pickup = coalesce(pickups.as_slice());

    let taxi_type_arms = TaxiType::ALL
        .into_iter()
        .filter(|taxi_type| pickups.contains(&taxi_type.pickup_column()))
        .map(|taxi_type| {
            format!(
                "WHEN {} IS NOT NULL THEN '{}'",
                qualified(taxi_type.pickup_column()),
                taxi_type.label()
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut select = SOURCE_CORRESPONDENCE
        .iter()
        .map(|(canonical, source)| {
            format!(
                "{} AS {canonical}",
                store::source_expression(columns, Some(SOURCE_ROWS), canonical, source)
            )
        })
        .collect::<Vec<_>>();
    select.push(format!("{pickup} AS pickup_datetime"));
    select.push(format!("{} AS dropoff_datetime", coalesce(dropoffs.as_slice())));
    select.push(format!("CASE {taxi_type_arms} END AS taxi_type"));

    Some(format!(
        "{} SELECT {} FROM {}.{TRIPS_TABLE} AS {SOURCE_ROWS} WHERE {pickup} IS NOT NULL",
        store::insert_prefix(),
        select.join(", "),
        quote_ident(alias)
    ))
}
