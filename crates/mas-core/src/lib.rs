//! Association study engine.
//!
//! - **grid**: one task per (predictor, dependent) pair
//! - **snapshot**: memory-mappable on-disk copy of the dataset
//! - **task**: per-task projection, viability checks and model fit
//! - **executor**: batched parallel execution with cancellation
//! - **aggregate**: result frames, relaxed concatenation and ranking
//! - **run**: the end-to-end pipeline

mod aggregate;
mod cancel;
mod error;
mod executor;
mod grid;
mod progress;
mod run;
mod snapshot;
mod task;

pub use aggregate::{concat_relaxed, count_outcomes, records_to_frame, sort_results};
pub use cancel::CancellationFlag;
pub use error::{Result, RunError};
pub use executor::{Executor, TaskSource, batch_size};
pub use grid::build_task_grid;
pub use progress::progress_interval;
pub use run::{RunOutput, run_analysis, run_analysis_with};
pub use snapshot::{LiveSnapshots, Snapshot};
pub use task::{TaskSettings, run_task};
