//! Run-level errors.
//!
//! Task-level problems never appear here; they are recorded as skipped or
//! failed rows of the result table.

use std::path::PathBuf;

use mas_model::ConfigError;
use mas_transform::TransformError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("dataframe operation failed: {0}")]
    Polars(#[from] PolarsError),

    /// Creating or writing the on-disk snapshot failed.
    #[error("snapshot error at {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled before all tasks finished.
    #[error("run interrupted")]
    Interrupted,
}

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;
