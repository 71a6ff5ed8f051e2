use serde::{Deserialize, Serialize};

/// Parameter value meaning "no filter on this dimension".
pub const WILDCARD: &str = "*";

pub fn is_wildcard(value: &str) -> bool {
    value == WILDCARD
}

/// Filters and grouping for one aggregation query. Every string field
/// defaults to [`WILDCARD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParameters {
    pub pickup_from: String,
    pub dropoff_to: String,
    pub pickup_location_id: String,
    pub dropoff_location_id: String,
    pub group_by_payment: bool,
    pub vendor_id: String,
    pub taxi_type: String,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            pickup_from: WILDCARD.to_string(),
            dropoff_to: WILDCARD.to_string(),
            pickup_location_id: WILDCARD.to_string(),
            dropoff_location_id: WILDCARD.to_string(),
            group_by_payment: false,
            vendor_id: WILDCARD.to_string(),
            taxi_type: WILDCARD.to_string(),
        }
    }
}

impl QueryParameters {
    /// Builds parameters from optional inputs, filling gaps with the wildcard.
    pub fn from_options(
        pickup_from: Option<String>,
        dropoff_to: Option<String>,
        pickup_location_id: Option<String>,
        dropoff_location_id: Option<String>,
        group_by_payment: bool,
        vendor_id: Option<String>,
        taxi_type: Option<String>,
    ) -> Self {
        let or_wildcard = |value: Option<String>| value.unwrap_or_else(|| WILDCARD.to_string());
        Self {
            pickup_from: or_wildcard(pickup_from),
            dropoff_to: or_wildcard(dropoff_to),
            pickup_location_id: or_wildcard(pickup_location_id),
            dropoff_location_id: or_wildcard(dropoff_location_id),
            group_by_payment,
            vendor_id: or_wildcard(vendor_id),
            taxi_type: or_wildcard(taxi_type),
        }
    }
}
