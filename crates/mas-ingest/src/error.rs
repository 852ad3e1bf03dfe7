//! Error types for input ingestion.

use std::path::PathBuf;

use mas_model::ConfigError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while probing or reading the input dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Invalid column selection or input path.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to open the input file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the CSV header.
    #[error("failed to parse header of {path}: {message}")]
    Header { path: PathBuf, message: String },

    /// Polars failed to decode the file.
    #[error("failed to load {path}: {source}")]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
