pub mod aggregate;
pub mod cli;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod lookup;
pub mod merge;
pub mod normalize;
pub mod params;
pub mod query;
pub mod results;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, OutputFormat},
    ingest::{CsvOptions, IngestOutcome},
    lookup::Lookups,
    params::QueryParameters,
    store::TripStore,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("trip_aggregator", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => handle_ingest(&args),
        Commands::Merge(args) => handle_merge(&args),
        Commands::Query(args) => handle_query(&args),
    }
}

fn handle_ingest(args: &cli::IngestArgs) -> Result<()> {
    info!(
        "Ingesting {} dataset(s) into {:?}",
        args.inputs.len(),
        args.output
    );
    let store = TripStore::create(&args.output)
        .with_context(|| format!("Creating trip store {:?}", args.output))?;
    let options = CsvOptions {
        delimiter: args.delimiter,
        encoding: args.input_encoding.clone(),
    };
    let reports = ingest::ingest_paths(&store, &args.inputs, &options)
        .with_context(|| format!("Ingesting datasets into {:?}", args.output))?;
    let skipped = reports
        .iter()
        .filter(|r| r.outcome == IngestOutcome::Skipped)
        .count();
    let total = store.trip_count().context("Counting trips")?;
    info!(
        "Store {:?} holds {total} trip(s); {} dataset(s) merged, {skipped} skipped",
        args.output,
        reports.len() - skipped
    );
    Ok(())
}

fn handle_merge(args: &cli::MergeArgs) -> Result<()> {
    info!(
        "Merging {} store(s) into {:?}",
        args.inputs.len(),
        args.output
    );
    let store = TripStore::create(&args.output)
        .with_context(|| format!("Creating trip store {:?}", args.output))?;
    let summary = merge::merge_sources(&store, &args.inputs)
        .with_context(|| format!("Merging stores into {:?}", args.output))?;
    info!(
        "Combined store {:?} complete with {} trip(s) from {} source(s)",
        args.output,
        summary.total_rows(),
        summary.sources.len()
    );
    Ok(())
}

fn handle_query(args: &cli::QueryArgs) -> Result<()> {
    if !args.db.exists() {
        bail!("Trip store {:?} does not exist", args.db);
    }
    let loaded;
    let lookups = match &args.lookups {
        Some(path) => {
            loaded =
                Lookups::load(path).with_context(|| format!("Loading lookups from {path:?}"))?;
            &loaded
        }
        None => Lookups::builtin(),
    };
    let params = QueryParameters::from_options(
        args.pickup_from.clone(),
        args.dropoff_to.clone(),
        args.pu_location.clone(),
        args.do_location.clone(),
        args.group_by_payment,
        args.vendor.clone(),
        args.taxi_type.clone(),
    );
    let store = TripStore::open_read_only(&args.db)
        .with_context(|| format!("Opening trip store {:?}", args.db))?;
    let results = aggregate::aggregate(&store, &params, lookups)
        .with_context(|| format!("Aggregating trips in {:?}", args.db))?;
    match args.format {
        OutputFormat::Table => table::print_results(&results),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&results).context("Serializing results")?
            );
        }
    }
    info!("Returned {} aggregation row(s)", results.len());
    Ok(())
}
