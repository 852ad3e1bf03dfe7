//! Core data model for multiple association studies.
//!
//! - **roles**: predictor / covariate / dependent assignment
//! - **task**: one unit of association work
//! - **outcome**: completed / skipped / failed results and the flat result row
//! - **schema**: result table column layout
//! - **options**: run configuration
//! - **error**: configuration errors

pub mod error;
pub mod options;
pub mod outcome;
pub mod roles;
pub mod schema;
pub mod task;

pub use error::{ConfigError, Result};
pub use options::{
    AnalysisConfig, AnalysisKind, ContinuousTransform, ExecutionMode, ExecutionOptions,
    FillStrategy, MissingPolicy, ModelKind, OutcomeKind, PreprocessOptions, SexOptions,
};
pub use outcome::{
    FitSummary, MISSING_COUNT, MISSING_FLOAT, MISSING_TEXT, OutcomeCounts, OutcomeStatus,
    ResultRecord, SampleCounts, SkipReason, TaskOutcome,
};
pub use roles::{ColumnRoleSet, Role};
pub use schema::{ColumnKind, ResultColumn, column_by_name, result_columns};
pub use task::{AnalysisTask, model_equation};
