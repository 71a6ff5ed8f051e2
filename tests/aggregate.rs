mod common;

use common::{GREEN_TRIPS, TestWorkspace, YELLOW_TRIPS, green_csv, yellow_csv};
use trip_aggregator::{
    aggregate::aggregate,
    error::TripError,
    ingest::{CsvOptions, InMemoryDataset, ingest, ingest_paths},
    lookup::Lookups,
    params::QueryParameters,
    results::AggregationResult,
    store::TripStore,
};

/// Store with yellow fares {10, 20, 30} and green fares {5, 15}.
fn populated_store(workspace: &TestWorkspace) -> TripStore {
    let yellow = workspace.write("yellow.csv", &yellow_csv(&YELLOW_TRIPS));
    let green = workspace.write("green.csv", &green_csv(&GREEN_TRIPS));
    let store = TripStore::create(&workspace.path().join("trips.sqlite")).expect("store");
    ingest_paths(&store, &[yellow, green], &CsvOptions::default()).expect("ingest");
    store
}

fn run(store: &TripStore, params: &QueryParameters) -> Vec<AggregationResult> {
    aggregate(store, params, Lookups::builtin()).expect("aggregate")
}

fn by_payment<'a>(results: &'a [AggregationResult], label: &str) -> &'a AggregationResult {
    results
        .iter()
        .find(|r| r.payment_type == label)
        .unwrap_or_else(|| panic!("no row for payment type {label}"))
}

#[test]
fn ungrouped_wildcard_query_covers_both_dialects() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);

    let results = run(&store, &QueryParameters::default());

    assert_eq!(
        results,
        vec![AggregationResult {
            taxi_type: "yellow and green".to_string(),
            vendor: "all".to_string(),
            payment_type: "all".to_string(),
            min_fare: 5.0,
            max_fare: 30.0,
            trip_count: 5,
            total_toll_fare: 3.5,
            total_fare: 80.0,
        }]
    );
}

#[test]
fn grouping_by_payment_yields_one_labeled_row_per_code() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        group_by_payment: true,
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.payment_type != "all"));
    let card = by_payment(&results, "Credit card");
    assert_eq!(card.trip_count, 2);
    assert_eq!(card.total_fare, 30.0);
    let cash = by_payment(&results, "Cash");
    assert_eq!(cash.trip_count, 2);
    assert_eq!(cash.min_fare, 5.0);
    assert_eq!(cash.max_fare, 30.0);
    let no_charge = by_payment(&results, "No charge");
    assert_eq!(no_charge.trip_count, 1);
    assert_eq!(no_charge.total_toll_fare, 0.5);
}

#[test]
fn taxi_type_filter_is_case_insensitive() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        taxi_type: "GREEN".to_string(),
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].taxi_type, "GREEN");
    assert_eq!(results[0].trip_count, 2);
    assert_eq!(results[0].total_fare, 20.0);
}

#[test]
fn unrecognized_taxi_type_matches_everything() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        taxi_type: "BOTH".to_string(),
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results[0].trip_count, 5);
    assert_eq!(results[0].taxi_type, "BOTH");
}

#[test]
fn time_window_and_location_filters_combine() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        pickup_from: "2025-05-01 00:00:00".to_string(),
        dropoff_to: "2025-05-31 23:59:59".to_string(),
        pickup_location_id: "100".to_string(),
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results[0].trip_count, 2);
    assert_eq!(results[0].min_fare, 10.0);
    assert_eq!(results[0].max_fare, 20.0);
}

#[test]
fn vendor_filter_labels_vendor_name() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        vendor_id: "2".to_string(),
        dropoff_location_id: "41".to_string(),
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results[0].vendor, "Curb Mobility, LLC");
    assert_eq!(results[0].trip_count, 1);
    assert_eq!(results[0].total_fare, 5.0);
}

#[test]
fn no_matching_trips_reports_zeroes() {
    let workspace = TestWorkspace::new();
    let store = populated_store(&workspace);
    let params = QueryParameters {
        vendor_id: "7".to_string(),
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].vendor, "Helix");
    assert_eq!(results[0].trip_count, 0);
    assert_eq!(results[0].min_fare, 0.0);
    assert_eq!(results[0].total_fare, 0.0);
}

#[test]
fn invalid_location_id_is_a_caller_error() {
    let store = TripStore::open_in_memory().expect("store");
    let params = QueryParameters {
        pickup_location_id: "JFK".to_string(),
        ..QueryParameters::default()
    };

    let err = aggregate(&store, &params, Lookups::builtin()).expect_err("bad location");

    assert!(matches!(err, TripError::InvalidInteger { .. }));
}

#[test]
fn non_integer_payment_codes_label_as_all() {
    let store = TripStore::open_in_memory().expect("store");
    let row = |payment: &str, fare: &str| {
        ["2025-05-01 08:00:00", payment, fare]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
    };
    let mut dataset = InMemoryDataset::new(
        "coded",
        ["tpep_pickup_datetime", "payment_type", "fare_amount"]
            .iter()
            .map(|v| v.to_string())
            .collect(),
        vec![row("CRD", "8"), row("1", "12")],
    );
    ingest(&store, &mut dataset).expect("ingest");
    let params = QueryParameters {
        group_by_payment: true,
        ..QueryParameters::default()
    };

    let results = run(&store, &params);

    assert_eq!(results.len(), 2);
    assert_eq!(by_payment(&results, "all").total_fare, 8.0);
    assert_eq!(by_payment(&results, "Credit card").total_fare, 12.0);
}
