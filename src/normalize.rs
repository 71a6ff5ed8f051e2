//! Dialect detection for incoming trip datasets.
//!
//! Yellow cab exports prefix their timestamp columns with `tpep_`, green
//! cab exports with `lpep_`. [`detect_columns`] scans a dataset's column
//! list and reports which timestamp columns to project and which taxi type
//! label the rows should carry.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const YELLOW_PICKUP_COLUMN: &str = "tpep_pickup_datetime";
pub const YELLOW_DROPOFF_COLUMN: &str = "tpep_dropoff_datetime";
pub const GREEN_PICKUP_COLUMN: &str = "lpep_pickup_datetime";
pub const GREEN_DROPOFF_COLUMN: &str = "lpep_dropoff_datetime";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxiType {
    Yellow,
    Green,
}

impl TaxiType {
    pub const ALL: [TaxiType; 2] = [TaxiType::Yellow, TaxiType::Green];

    pub fn label(self) -> &'static str {
        match self {
            TaxiType::Yellow => "yellow",
            TaxiType::Green => "green",
        }
    }

    /// Case-insensitive match against the two known labels.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|taxi_type| taxi_type.label().eq_ignore_ascii_case(value))
    }

    pub fn pickup_column(self) -> &'static str {
        match self {
            TaxiType::Yellow => YELLOW_PICKUP_COLUMN,
            TaxiType::Green => GREEN_PICKUP_COLUMN,
        }
    }

    pub fn dropoff_column(self) -> &'static str {
        match self {
            TaxiType::Yellow => YELLOW_DROPOFF_COLUMN,
            TaxiType::Green => GREEN_DROPOFF_COLUMN,
        }
    }
}

impl fmt::Display for TaxiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub pickup_column: Option<String>,
    pub dropoff_column: Option<String>,
    pub taxi_type: Option<TaxiType>,
}

impl ColumnMapping {
    pub fn is_mappable(&self) -> bool {
        self.taxi_type.is_some()
    }
}

/// Scans columns in declaration order. Names match exactly; when both
/// dialects' pickup columns are present the later one wins.
pub fn detect_columns<I, S>(columns: I) -> ColumnMapping
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut mapping = ColumnMapping::default();
    for column in columns {
        let column = column.as_ref();
        if column == YELLOW_PICKUP_COLUMN {
            mapping.taxi_type = Some(TaxiType::Yellow);
            mapping.pickup_column = Some(column.to_string());
        } else if column == GREEN_PICKUP_COLUMN {
            mapping.taxi_type = Some(TaxiType::Green);
            mapping.pickup_column = Some(column.to_string());
        }
        if column == YELLOW_DROPOFF_COLUMN || column == GREEN_DROPOFF_COLUMN {
            mapping.dropoff_column = Some(column.to_string());
        }
    }
    mapping
}
