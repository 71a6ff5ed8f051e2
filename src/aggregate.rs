use log::debug;
use rusqlite::params_from_iter;

use crate::{
    error::Result,
    lookup::Lookups,
    params::QueryParameters,
    query::AggregationQuery,
    results::{AggregationResult, RawAggregateRow, map_results},
    store::TripStore,
};

/// Builds, executes and labels one aggregation query against `store`.
pub fn aggregate(
    store: &TripStore,
    params: &QueryParameters,
    lookups: &Lookups,
) -> Result<Vec<AggregationResult>> {
    let query = AggregationQuery::build(params)?;
    debug!(
        "Executing '{}' with {} binding(s)",
        query.sql,
        query.predicates.len()
    );
    let rows = fetch_rows(store, &query)?;
    Ok(map_results(&rows, params, lookups))
}

pub fn fetch_rows(store: &TripStore, query: &AggregationQuery) -> Result<Vec<RawAggregateRow>> {
    let mut stmt = store.connection().prepare(&query.sql)?;
    let grouped = query.group_by_payment;
    let rows = stmt
        .query_map(params_from_iter(query.bindings()), |row| {
            RawAggregateRow::from_row(row, grouped)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
