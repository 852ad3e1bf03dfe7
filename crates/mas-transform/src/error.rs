//! Error types for preprocessing.

use mas_model::ConfigError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by preprocessing transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The dataset or options violate a configuration rule.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A DataFrame operation failed.
    #[error("dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, TransformError>;
