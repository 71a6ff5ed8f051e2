//! Labeled aggregation results.

use rusqlite::{Row, types::Value};
use serde::{Deserialize, Serialize};

use crate::{
    lookup::Lookups,
    params::{QueryParameters, is_wildcard},
};

pub const ALL_LABEL: &str = "all";
pub const ALL_TAXI_TYPES_LABEL: &str = "yellow and green";

/// One row as returned by the engine. NULL aggregates (no matching trips)
/// read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAggregateRow {
    pub min_fare: f64,
    pub max_fare: f64,
    pub trip_count: i64,
    pub total_toll_fare: f64,
    pub total_fare: f64,
    pub payment_type: Option<i64>,
}

impl RawAggregateRow {
    pub fn from_row(row: &Row<'_>, grouped: bool) -> rusqlite::Result<Self> {
        let amount = |name: &str| -> rusqlite::Result<f64> {
            Ok(row.get::<_, Option<f64>>(name)?.unwrap_or_default())
        };
        Ok(Self {
            min_fare: amount("min_fare")?,
            max_fare: amount("max_fare")?,
            trip_count: row.get("trip_count")?,
            total_toll_fare: amount("total_toll_fare")?,
            total_fare: amount("total_fare")?,
            payment_type: if grouped {
                payment_code(row.get("payment_type")?)
            } else {
                None
            },
        })
    }
}

/// Integer payment code, or `None` for NULL and values that are not
/// whole numbers (these label as "all").
fn payment_code(value: Value) -> Option<i64> {
    match value {
        Value::Integer(code) => Some(code),
        Value::Real(code) if code.fract() == 0.0 => Some(code as i64),
        Value::Text(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub taxi_type: String,
    pub vendor: String,
    pub payment_type: String,
    pub min_fare: f64,
    pub max_fare: f64,
    pub trip_count: i64,
    pub total_toll_fare: f64,
    pub total_fare: f64,
}

/// Labels each raw row. Taxi type and vendor come from the parameters,
/// payment type from the row when grouping.
pub fn map_results(
    rows: &[RawAggregateRow],
    params: &QueryParameters,
    lookups: &Lookups,
) -> Vec<AggregationResult> {
    let taxi_type = if is_wildcard(&params.taxi_type) {
        ALL_TAXI_TYPES_LABEL.to_string()
    } else {
        params.taxi_type.clone()
    };
    let vendor = vendor_label(&params.vendor_id, lookups);

    rows.iter()
        .map(|row| AggregationResult {
            taxi_type: taxi_type.clone(),
            vendor: vendor.clone(),
            payment_type: payment_label(params.group_by_payment, row.payment_type, lookups),
            min_fare: row.min_fare,
            max_fare: row.max_fare,
            trip_count: row.trip_count,
            total_toll_fare: row.total_toll_fare,
            total_fare: row.total_fare,
        })
        .collect()
}

/// Unknown vendor ids keep their raw text as the label.
fn vendor_label(vendor_id: &str, lookups: &Lookups) -> String {
    if is_wildcard(vendor_id) {
        return ALL_LABEL.to_string();
    }
    vendor_id
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| lookups.vendor_name(id))
        .unwrap_or(vendor_id)
        .to_string()
}

fn payment_label(grouped: bool, code: Option<i64>, lookups: &Lookups) -> String {
    let label = match code {
        Some(code) if grouped => lookups.payment_type_name(code).unwrap_or(ALL_LABEL),
        _ => ALL_LABEL,
    };
    label.to_string()
}
