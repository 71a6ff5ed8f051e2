use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TripError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TripError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to decode text with encoding {encoding}")]
    Decode { encoding: &'static str },
    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("Invalid integer '{value}' for {field}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("Source store {0:?} does not exist")]
    SourceNotFound(PathBuf),
    #[error("Source store {0:?} has no trips table")]
    MissingSourceTable(PathBuf),
}
