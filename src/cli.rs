use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::io_utils::parse_delimiter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize taxi trip datasets and aggregate fares", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rebuild a trip store from yellow and green CSV datasets
    Ingest(IngestArgs),
    /// Rebuild a trip store by merging per-source SQLite stores
    Merge(MergeArgs),
    /// Aggregate fares over a trip store
    Query(QueryArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// One or more CSV/TSV trip datasets
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Destination store (replaced if it exists)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// One or more SQLite stores holding a raw `trips` table
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Destination store (replaced if it exists)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Trip store to query
    #[arg(short = 'd', long = "db")]
    pub db: PathBuf,
    /// Earliest pickup timestamp, e.g. `2025-05-01 00:00:00` (`*` for any)
    #[arg(long = "pickup-from")]
    pub pickup_from: Option<String>,
    /// Latest dropoff timestamp
    #[arg(long = "dropoff-to")]
    pub dropoff_to: Option<String>,
    /// Pickup location id
    #[arg(long = "pu-location")]
    pub pu_location: Option<String>,
    /// Dropoff location id
    #[arg(long = "do-location")]
    pub do_location: Option<String>,
    /// Emit one row per payment type
    #[arg(long = "group-by-payment")]
    pub group_by_payment: bool,
    /// Vendor id
    #[arg(long = "vendor")]
    pub vendor: Option<String>,
    /// `yellow` or `green`; any other value applies no filter
    #[arg(long = "taxi-type")]
    pub taxi_type: Option<String>,
    /// YAML file overriding the vendor and payment type labels
    #[arg(long)]
    pub lookups: Option<PathBuf>,
    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
