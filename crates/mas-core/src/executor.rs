//! Parallel execution of the task grid.
//!
//! Tasks run in batches of `min(100, max(10, n / 10))` on a pool of `workers`
//! threads. Each worker owns a numeric pool of `threads_per_worker` threads
//! that the solver's row-parallel work runs on, which caps the total thread
//! budget at `workers * threads_per_worker`.
//!
//! Two data sources give identical results:
//!
//! - **in-memory**: a lazy projection over the shared `DataFrame`
//! - **snapshot**: a memory-mapped projection of the on-disk IPC snapshot

use std::sync::Arc;

use mas_model::{AnalysisConfig, AnalysisTask, ResultRecord, TaskOutcome, model_equation};
use mas_regress::Regression;
use polars::prelude::{DataFrame, IntoLazy, col};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug_span, info, warn};

use crate::cancel::CancellationFlag;
use crate::error::{Result, RunError};
use crate::progress::Progress;
use crate::snapshot::Snapshot;
use crate::task::{TaskSettings, run_task};

/// Where workers read task columns from.
#[derive(Debug)]
pub enum TaskSource {
    InMemory(Arc<DataFrame>),
    Snapshot(Snapshot),
}

impl TaskSource {
    /// Materialize just `columns` for one task.
    pub fn project(&self, columns: &[String]) -> Result<DataFrame> {
        match self {
            Self::InMemory(frame) => {
                let exprs: Vec<_> = columns.iter().map(|name| col(name.as_str())).collect();
                Ok(frame.as_ref().clone().lazy().select(exprs).collect()?)
            }
            Self::Snapshot(snapshot) => snapshot.open_projection(columns),
        }
    }
}

/// Number of tasks evaluated between cancellation checkpoints.
pub fn batch_size(n_tasks: usize) -> usize {
    (n_tasks / 10).clamp(10, 100)
}

/// Runs tasks with a fixed solver and thread budget.
pub struct Executor {
    solver: Arc<dyn Regression>,
    settings: TaskSettings,
    workers: usize,
    threads_per_worker: usize,
}

impl Executor {
    pub fn new(solver: Arc<dyn Regression>, config: &AnalysisConfig) -> Self {
        Self {
            solver,
            settings: TaskSettings {
                outcome: config.outcome_kind(),
                min_cases: config.min_cases,
                min_observations: config.min_observations,
            },
            workers: config.execution.workers.max(1),
            threads_per_worker: config.execution.threads_per_worker.max(1),
        }
    }

    /// Evaluate every task, returning one record batch per executed batch in
    /// task order.
    ///
    /// Stops between tasks once `cancel` is set and returns
    /// [`RunError::Interrupted`].
    pub fn execute(
        &self,
        tasks: &[AnalysisTask],
        source: &TaskSource,
        cancel: &CancellationFlag,
    ) -> Result<Vec<Vec<ResultRecord>>> {
        self.check_thread_budget();
        let workers = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("mas-worker-{index}"))
            .build()?;
        let numeric = (0..self.workers)
            .map(|worker| {
                ThreadPoolBuilder::new()
                    .num_threads(self.threads_per_worker)
                    .thread_name(move |index| format!("mas-numeric-{worker}-{index}"))
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let progress = Progress::new(tasks.len());
        let size = batch_size(tasks.len());
        info!(
            tasks = tasks.len(),
            batch_size = size,
            workers = self.workers,
            threads_per_worker = self.threads_per_worker,
            solver = self.solver.name(),
            "starting association tasks"
        );

        let mut batches = Vec::with_capacity(tasks.len().div_ceil(size));
        for batch in tasks.chunks(size) {
            if cancel.is_cancelled() {
                return Err(self.interrupted(&progress));
            }
            let records: Vec<Option<ResultRecord>> = workers.install(|| {
                batch
                    .par_iter()
                    .map(|task| {
                        if cancel.is_cancelled() {
                            return None;
                        }
                        let record = self.run_one(task, source, &numeric);
                        progress.task_finished();
                        Some(record)
                    })
                    .collect()
            });
            match records.into_iter().collect::<Option<Vec<_>>>() {
                Some(records) => batches.push(records),
                None => return Err(self.interrupted(&progress)),
            }
        }
        Ok(batches)
    }

    fn run_one(
        &self,
        task: &AnalysisTask,
        source: &TaskSource,
        numeric: &[ThreadPool],
    ) -> ResultRecord {
        let span = debug_span!(
            "task",
            index = task.index,
            predictor = %task.predictor,
            dependent = %task.dependent
        );
        let _entered = span.enter();
        let outcome = match source.project(&task.columns()) {
            Ok(data) => {
                let solve = || {
                    span.in_scope(|| run_task(task, &data, &self.settings, self.solver.as_ref()))
                };
                match rayon::current_thread_index().and_then(|index| numeric.get(index)) {
                    Some(pool) => pool.install(solve),
                    None => solve(),
                }
            }
            Err(error) => TaskOutcome::Failed {
                reason: error.to_string(),
                counts: None,
                equation: model_equation(&task.dependent, &task.predictor, &task.covariates),
            },
        };
        if let TaskOutcome::Failed { reason, .. } = &outcome {
            warn!(
                predictor = %task.predictor,
                dependent = %task.dependent,
                "{} regression failed: {reason}",
                self.solver.name()
            );
        }
        ResultRecord::from_outcome(task, &outcome)
    }

    fn check_thread_budget(&self) {
        let available = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        let requested = self.workers * self.threads_per_worker;
        if requested > available {
            warn!(
                workers = self.workers,
                threads_per_worker = self.threads_per_worker,
                available,
                "requested {requested} threads but only {available} are available"
            );
        }
    }

    fn interrupted(&self, progress: &Progress) -> RunError {
        warn!(completed = progress.finished(), "cancellation requested, stopping");
        RunError::Interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_is_clamped() {
        assert_eq!(batch_size(6), 10);
        assert_eq!(batch_size(450), 45);
        assert_eq!(batch_size(50_000), 100);
    }
}
