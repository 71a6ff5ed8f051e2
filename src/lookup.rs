//! Vendor and payment-type label tables.
//!
//! The built-in tables are created once per process and never mutated. A
//! YAML file can supply replacements; sections it omits keep the built-in
//! entries.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const BUILTIN_VENDORS: &[(i64, &str)] = &[
    (1, "Creative Mobile Technologies, LLC"),
    (2, "Curb Mobility, LLC"),
    (6, "Myle Technologies Inc"),
    (7, "Helix"),
];

const BUILTIN_PAYMENT_TYPES: &[(i64, &str)] = &[
    (0, "Flex Fare trip"),
    (1, "Credit card"),
    (2, "Cash"),
    (3, "No charge"),
    (4, "Dispute"),
    (5, "Unknown"),
    (6, "Voided trip"),
];

static BUILTIN: OnceLock<Lookups> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookups {
    pub vendors: BTreeMap<i64, String>,
    pub payment_types: BTreeMap<i64, String>,
}

impl Default for Lookups {
    fn default() -> Self {
        let table = |entries: &[(i64, &str)]| -> BTreeMap<i64, String> {
            entries
                .iter()
                .map(|(code, name)| (*code, name.to_string()))
                .collect()
        };
        Self {
            vendors: table(BUILTIN_VENDORS),
            payment_types: table(BUILTIN_PAYMENT_TYPES),
        }
    }
}

impl Lookups {
    pub fn builtin() -> &'static Lookups {
        BUILTIN.get_or_init(Lookups::default)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn vendor_name(&self, id: i64) -> Option<&str> {
        self.vendors.get(&id).map(String::as_str)
    }

    pub fn payment_type_name(&self, code: i64) -> Option<&str> {
        self.payment_types.get(&code).map(String::as_str)
    }
}
