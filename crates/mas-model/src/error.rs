//! Configuration error taxonomy.
//!
//! Every variant here is fatal and is raised before any analysis work starts.

use std::path::PathBuf;
use thiserror::Error;

/// Errors caused by an invalid run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    // === Input / Output ===
    /// Input file does not exist.
    #[error("input file does not exist: {path}")]
    InputNotFound { path: PathBuf },

    /// Output directory does not exist.
    #[error("output directory does not exist: {path}")]
    OutputDirMissing { path: PathBuf },

    /// Input suffix is not one of the supported formats.
    #[error("unsupported input file format: '{suffix}' (expected .parquet, .csv, .tsv or .txt)")]
    UnsupportedInputFormat { suffix: String },

    // === Column selection ===
    /// Column name not present in the input schema.
    #[error("column {name} does not exist in the input file")]
    UnknownColumn { name: String },

    /// Single index or range start past the last column.
    #[error("index {index} is out of range for input file with {n_columns} columns")]
    IndexOutOfRange { index: usize, n_columns: usize },

    /// Range end past the number of columns.
    #[error(
        "end index {end} out of range for {n_columns} columns; to use all remaining columns write i:{start}-"
    )]
    RangeEndOutOfRange {
        start: usize,
        end: usize,
        n_columns: usize,
    },

    /// Index specifier could not be parsed.
    #[error("invalid index format '{spec}': use i:<index>, i:<start>-<end>, or i:<start>-")]
    InvalidIndexSpec { spec: String },

    /// The same column was assigned to two roles.
    #[error("{first} and {second} columns must be unique (shared: {})", columns.join(", "))]
    OverlappingRoles {
        first: &'static str,
        second: &'static str,
        columns: Vec<String>,
    },

    /// No predictor or no dependent columns were selected.
    #[error("at least one {role} column is required")]
    EmptyRole { role: &'static str },

    // === Preprocessing ===
    /// Missing-value strategy name not recognised.
    #[error(
        "unknown missing-value strategy '{name}' (expected drop or fill:<forward|backward|min|max|mean|mode|zero|one>)"
    )]
    UnknownMissingStrategy { name: String },

    /// Continuous transform name not recognised.
    #[error("unknown continuous transform '{name}' (expected standard or min-max)")]
    UnknownTransform { name: String },

    /// Columns with at most one distinct non-null value.
    #[error("columns {} are constant; remove them from the analysis or enable dropping constants", columns.join(","))]
    ConstantColumns { columns: Vec<String> },

    /// Binary-outcome dependents that are not coded 0/1.
    #[error("dependent variables {} are not binary (0/1); use a linear model or remove them", columns.join(","))]
    NonBinaryDependents { columns: Vec<String> },

    /// Categorical column that is neither a predictor nor a covariate.
    #[error("categorical column {name} must be a predictor or covariate")]
    CategoricalWithoutRole { name: String },

    /// Restrict-to-one-sex and PheWAS sex filtering requested together.
    #[error("sex restriction and PheWAS sex filtering cannot be combined")]
    ConflictingSexOptions,

    /// A sex option was given without a sex column.
    #[error("sex filtering requires a sex column")]
    MissingSexColumn,

    // === Model / execution ===
    /// Model name not recognised.
    #[error("model '{name}' is not supported (expected firth, logistic or linear)")]
    UnsupportedModel { name: String },

    /// Numeric option outside its valid range.
    #[error("invalid value for {option}: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

/// Result alias for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;
