//! Evaluation of a single association task.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use mas_model::{
    AnalysisTask, OutcomeKind, SampleCounts, SkipReason, TaskOutcome, model_equation,
};
use mas_regress::{Design, Fit, Regression};
use mas_transform::constant_columns;
use mas_transform::data_utils::float_values;
use polars::prelude::{DataFrame, PolarsResult};
use tracing::debug;

/// Thresholds and outcome kind shared by every task of a run.
#[derive(Debug, Clone, Copy)]
pub struct TaskSettings {
    pub outcome: OutcomeKind,
    pub min_cases: u64,
    pub min_observations: usize,
}

/// Evaluate one task over its projected columns.
///
/// Never fails: data problems become `Skipped`, solver errors and panics
/// become `Failed`.
pub fn run_task(
    task: &AnalysisTask,
    data: &DataFrame,
    settings: &TaskSettings,
    solver: &dyn Regression,
) -> TaskOutcome {
    evaluate(task, data, settings, solver).unwrap_or_else(|error| TaskOutcome::Failed {
        reason: error.to_string(),
        counts: None,
        equation: model_equation(&task.dependent, &task.predictor, &task.covariates),
    })
}

fn evaluate(
    task: &AnalysisTask,
    data: &DataFrame,
    settings: &TaskSettings,
    solver: &dyn Regression,
) -> PolarsResult<TaskOutcome> {
    let keys = [task.predictor.clone(), task.dependent.clone()];
    let subset = data.drop_nulls(Some(keys.as_slice()))?;
    let n = subset.height();
    if n == 0 {
        return Ok(TaskOutcome::Skipped {
            reason: SkipReason::NoData,
            counts: None,
        });
    }

    let y = dense(float_values(&subset, &task.dependent)?);
    let counts = sample_counts(&y, settings.outcome);
    if let Some(reason) = fitness(counts, settings) {
        debug!(
            predictor = %task.predictor,
            dependent = %task.dependent,
            %reason,
            "skipping task"
        );
        return Ok(TaskOutcome::Skipped {
            reason,
            counts: Some(counts),
        });
    }

    let constants = constant_columns(&subset, &task.covariates)?;
    if !constants.is_empty() {
        debug!(
            dependent = %task.dependent,
            columns = %constants.join(","),
            "dropping covariates constant within task"
        );
    }
    let covariates: Vec<String> = task
        .covariates
        .iter()
        .filter(|name| !constants.contains(name))
        .cloned()
        .collect();
    let equation = model_equation(&task.dependent, &task.predictor, &covariates);

    let mut columns = Vec::with_capacity(covariates.len() + 1);
    for name in std::iter::once(&task.predictor).chain(&covariates) {
        columns.push(dense(float_values(&subset, name)?));
    }
    let fitted = Design::from_columns(&columns, true)
        .map_err(|error| error.to_string())
        .and_then(|design| guarded_fit(solver, &design, &y));

    Ok(match fitted {
        Ok(fit) => TaskOutcome::Completed {
            fit: fit.summary(),
            counts,
            equation,
        },
        Err(reason) => TaskOutcome::Failed {
            reason,
            counts: Some(counts),
            equation,
        },
    })
}

/// Nulls become NaN so the solver rejects rows it cannot use.
fn dense(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

fn sample_counts(y: &[f64], outcome: OutcomeKind) -> SampleCounts {
    let total = y.len() as i64;
    match outcome {
        OutcomeKind::Binary => {
            let cases = y.iter().filter(|v| **v == 1.0).count() as i64;
            SampleCounts::Binary {
                cases,
                controls: total - cases,
                total,
            }
        }
        OutcomeKind::Continuous => SampleCounts::Continuous {
            n_observations: total,
        },
    }
}

/// First failed viability check, in case, control, all-cases order.
fn fitness(counts: SampleCounts, settings: &TaskSettings) -> Option<SkipReason> {
    match counts {
        SampleCounts::Binary {
            cases, controls, ..
        } => {
            let min = i64::try_from(settings.min_cases).unwrap_or(i64::MAX);
            if cases < min {
                Some(SkipReason::InsufficientCases(cases))
            } else if controls < min {
                Some(SkipReason::InsufficientControls(controls))
            } else if controls == 0 {
                Some(SkipReason::AllCases)
            } else {
                None
            }
        }
        SampleCounts::Continuous { n_observations } => {
            let n = usize::try_from(n_observations).unwrap_or(0);
            (n < settings.min_observations).then_some(SkipReason::NotEnoughObservations(n))
        }
    }
}

fn guarded_fit(
    solver: &dyn Regression,
    design: &Design,
    y: &[f64],
) -> std::result::Result<Fit, String> {
    match catch_unwind(AssertUnwindSafe(|| solver.fit(design, y))) {
        Ok(Ok(fit)) => Ok(fit),
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(format!("solver panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
