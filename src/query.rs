//! Aggregation query construction.
//!
//! [`AggregationQuery::build`] turns [`QueryParameters`] into SQL plus a
//! positional binding list. Predicates are collected in a fixed order and
//! each carries its own binding, so the rendered `?` placeholders and the
//! bindings can never drift apart.

use itertools::Itertools;
use rusqlite::{
    ToSql,
    types::{ToSqlOutput, Value},
};

use crate::{
    error::{Result, TripError},
    normalize::TaxiType,
    params::{QueryParameters, is_wildcard},
    store::TRIPS_TABLE,
};

pub const AGGREGATES: &[&str] = &[
    "MIN(fare_amount) AS min_fare",
    "MAX(fare_amount) AS max_fare",
    "COUNT(*) AS trip_count",
    "SUM(fare_amount) AS total_fare",
    "SUM(tolls_amount) AS total_toll_fare",
];

pub const PAYMENT_TYPE_COLUMN: &str = "payment_type";

#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

impl ToSql for BindValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BindValue::Text(text) => ToSqlOutput::from(text.as_str()),
            BindValue::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ge,
    Le,
}

impl Comparison {
    fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: &'static str,
    pub comparison: Comparison,
    pub value: BindValue,
}

impl Predicate {
    pub fn clause(&self) -> String {
        format!("{} {} ?", self.column, self.comparison.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationQuery {
    pub sql: String,
    pub predicates: Vec<Predicate>,
    pub group_by_payment: bool,
}

impl AggregationQuery {
    pub fn build(params: &QueryParameters) -> Result<Self> {
        let predicates = collect_predicates(params)?;
        let sql = render(&predicates, params.group_by_payment);
        Ok(Self {
            sql,
            predicates,
            group_by_payment: params.group_by_payment,
        })
    }

    /// Binding values in placeholder order.
    pub fn bindings(&self) -> impl Iterator<Item = &BindValue> {
        self.predicates.iter().map(|p| &p.value)
    }
}

fn collect_predicates(params: &QueryParameters) -> Result<Vec<Predicate>> {
    let mut predicates = Vec::new();
    let mut push = |column, comparison, value| {
        predicates.push(Predicate {
            column,
            comparison,
            value,
        })
    };

    if !is_wildcard(&params.pickup_from) {
        push(
            "pickup_datetime",
            Comparison::Ge,
            BindValue::Text(params.pickup_from.clone()),
        );
    }
    if !is_wildcard(&params.dropoff_to) {
        push(
            "dropoff_datetime",
            Comparison::Le,
            BindValue::Text(params.dropoff_to.clone()),
        );
    }
    if !is_wildcard(&params.pickup_location_id) {
        let id = parse_integer("pickup location id", &params.pickup_location_id)?;
        push("pu_location_id", Comparison::Eq, BindValue::Integer(id));
    }
    if !is_wildcard(&params.dropoff_location_id) {
        let id = parse_integer("dropoff location id", &params.dropoff_location_id)?;
        push("do_location_id", Comparison::Eq, BindValue::Integer(id));
    }
    if !is_wildcard(&params.vendor_id) {
        let id = parse_integer("vendor id", &params.vendor_id)?;
        push("vendor_id", Comparison::Eq, BindValue::Integer(id));
    }
    // Anything other than the two known labels is treated as no filter.
    if let Some(taxi_type) = TaxiType::from_label(&params.taxi_type) {
        push(
            "taxi_type",
            Comparison::Eq,
            BindValue::Text(taxi_type.label().to_string()),
        );
    }
    Ok(predicates)
}

fn render(predicates: &[Predicate], group_by_payment: bool) -> String {
    let mut sql = format!("SELECT {}", AGGREGATES.join(", "));
    if group_by_payment {
        sql.push_str(", ");
        sql.push_str(PAYMENT_TYPE_COLUMN);
    }
    sql.push_str(" FROM ");
    sql.push_str(TRIPS_TABLE);
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.iter().map(Predicate::clause).join(" AND "));
    }
    if group_by_payment {
        sql.push_str(" GROUP BY ");
        sql.push_str(PAYMENT_TYPE_COLUMN);
    }
    sql
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| TripError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}
