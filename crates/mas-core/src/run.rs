//! End-to-end orchestration of one association run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mas_model::{AnalysisConfig, ColumnRoleSet, ExecutionMode, OutcomeCounts};
use mas_regress::{Model, Regression};
use polars::prelude::{DataFrame, PolarsResult};
use tracing::{error, info, info_span, warn};

use crate::aggregate::{concat_relaxed, count_outcomes, records_to_frame, sort_results};
use crate::cancel::CancellationFlag;
use crate::error::{Result, RunError};
use crate::executor::{Executor, TaskSource};
use crate::grid::build_task_grid;
use crate::snapshot::Snapshot;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One row per task, sorted by p-value.
    pub results: DataFrame,
    pub counts: OutcomeCounts,
    pub n_tasks: usize,
    pub elapsed: Duration,
}

/// Run every (predictor, dependent) task with the configured model.
///
/// `frame` must already be preprocessed for `roles`.
pub fn run_analysis(
    frame: &DataFrame,
    roles: &ColumnRoleSet,
    config: &AnalysisConfig,
    cancel: &CancellationFlag,
) -> Result<RunOutput> {
    let solver: Arc<dyn Regression> = Arc::new(Model::from_kind(config.model));
    run_analysis_with(frame, roles, config, cancel, solver)
}

/// Same as [`run_analysis`] with an explicit solver.
pub fn run_analysis_with(
    frame: &DataFrame,
    roles: &ColumnRoleSet,
    config: &AnalysisConfig,
    cancel: &CancellationFlag,
    solver: Arc<dyn Regression>,
) -> Result<RunOutput> {
    let started = Instant::now();
    let _span = info_span!(
        "run",
        analysis = %config.analysis,
        model = %config.model,
        mode = config.execution.mode.as_str()
    )
    .entered();
    config.validate()?;

    let tasks = build_task_grid(roles);
    info!(
        "starting association analyses for {} groups ({} predictors x {} dependents)",
        tasks.len(),
        roles.predictors().len(),
        roles.dependents().len()
    );
    info!("using {} for analysis", config.model.description());

    let projected = frame.select(roles.all_columns())?;
    let source = match config.execution.mode {
        ExecutionMode::Lazy => TaskSource::InMemory(Arc::new(projected)),
        ExecutionMode::Snapshot => {
            let snapshot = Snapshot::materialize(&projected)?;
            cancel.live_snapshots().insert(snapshot.dir().to_path_buf());
            TaskSource::Snapshot(snapshot)
        }
    };
    let executed = Executor::new(solver, config).execute(&tasks, &source, cancel);
    if let TaskSource::Snapshot(snapshot) = source {
        let dir = snapshot.dir().to_path_buf();
        snapshot.close();
        cancel.live_snapshots().remove(&dir);
    }
    let batches = match executed {
        Ok(batches) => batches,
        Err(RunError::Interrupted) => {
            warn!("association run interrupted");
            return Err(RunError::Interrupted);
        }
        Err(err) => {
            error!(error = %err, "association run failed");
            return Err(err);
        }
    };

    let counts = count_outcomes(batches.iter().flatten());
    let frames = batches
        .iter()
        .map(|batch| records_to_frame(batch, config.model))
        .collect::<PolarsResult<Vec<_>>>()?;
    let combined = if frames.is_empty() {
        records_to_frame(&[], config.model)?
    } else {
        concat_relaxed(frames)?
    };
    let results = sort_results(&combined)?;
    let elapsed = started.elapsed();
    info!(
        completed = counts.completed,
        skipped = counts.skipped,
        failed = counts.failed,
        elapsed_secs = elapsed.as_secs_f64(),
        "association analyses complete"
    );
    Ok(RunOutput {
        results,
        counts,
        n_tasks: tasks.len(),
        elapsed,
    })
}
