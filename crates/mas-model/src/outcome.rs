//! Per-task outcomes and the fixed-schema result record.
//!
//! A task either completes, is skipped as statistically unfit, or fails inside
//! the solver. All three flatten into [`ResultRecord`], whose unset fields hold
//! the sentinels below so heterogeneous rows concatenate without loss.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::AnalysisTask;

/// Sentinel for unset numeric statistics.
pub const MISSING_FLOAT: f64 = f64::NAN;
/// Sentinel for unset counts.
pub const MISSING_COUNT: i64 = -9;
/// Sentinel for unset text fields.
pub const MISSING_TEXT: &str = "nan";

/// Statistics for the predictor coefficient of a completed fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub pval: f64,
    pub beta: f64,
    pub se: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    /// `exp(beta)`; binary-outcome models only.
    pub odds_ratio: Option<f64>,
    pub converged: bool,
}

/// Sample sizes observed for a task after null dropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleCounts {
    Binary {
        cases: i64,
        controls: i64,
        total: i64,
    },
    Continuous {
        n_observations: i64,
    },
}

/// Why a task was not fitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoData,
    InsufficientCases(i64),
    InsufficientControls(i64),
    AllCases,
    NotEnoughObservations(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("No data after dropping nulls."),
            Self::InsufficientCases(cases) => {
                write!(f, "Insufficient case count ({cases} cases).")
            }
            Self::InsufficientControls(controls) => {
                write!(f, "Insufficient control count ({controls} controls).")
            }
            Self::AllCases => f.write_str("All observations are cases."),
            Self::NotEnoughObservations(rows) => {
                write!(f, "Not enough observations ({rows}).")
            }
        }
    }
}

/// Coarse outcome kind, used for the status column and run-end counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Completed,
    Skipped,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Result of running one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Completed {
        fit: FitSummary,
        counts: SampleCounts,
        equation: String,
    },
    Skipped {
        reason: SkipReason,
        counts: Option<SampleCounts>,
    },
    Failed {
        reason: String,
        counts: Option<SampleCounts>,
        equation: String,
    },
}

impl TaskOutcome {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Completed { .. } => OutcomeStatus::Completed,
            Self::Skipped { .. } => OutcomeStatus::Skipped,
            Self::Failed { .. } => OutcomeStatus::Failed,
        }
    }
}

/// One row of the result table in the fixed superset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub predictor: String,
    pub dependent: String,
    pub status: OutcomeStatus,
    pub pval: f64,
    pub beta: f64,
    pub se: f64,
    pub odds_ratio: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub cases: i64,
    pub controls: i64,
    pub total_n: i64,
    pub n_observations: i64,
    pub converged: bool,
    pub failed_reason: String,
    pub equation: String,
}

impl ResultRecord {
    /// Row with every field at its sentinel.
    pub fn empty(task: &AnalysisTask, status: OutcomeStatus) -> Self {
        Self {
            predictor: task.predictor.clone(),
            dependent: task.dependent.clone(),
            status,
            pval: MISSING_FLOAT,
            beta: MISSING_FLOAT,
            se: MISSING_FLOAT,
            odds_ratio: MISSING_FLOAT,
            ci_low: MISSING_FLOAT,
            ci_high: MISSING_FLOAT,
            cases: MISSING_COUNT,
            controls: MISSING_COUNT,
            total_n: MISSING_COUNT,
            n_observations: MISSING_COUNT,
            converged: false,
            failed_reason: MISSING_TEXT.to_string(),
            equation: MISSING_TEXT.to_string(),
        }
    }

    /// Flatten an outcome into the superset schema.
    pub fn from_outcome(task: &AnalysisTask, outcome: &TaskOutcome) -> Self {
        let mut record = Self::empty(task, outcome.status());
        match outcome {
            TaskOutcome::Completed {
                fit,
                counts,
                equation,
            } => {
                record.pval = fit.pval;
                record.beta = fit.beta;
                record.se = fit.se;
                record.ci_low = fit.ci_low;
                record.ci_high = fit.ci_high;
                record.odds_ratio = fit.odds_ratio.unwrap_or(MISSING_FLOAT);
                record.converged = fit.converged;
                record.apply_counts(*counts);
                record.equation = equation.clone();
            }
            TaskOutcome::Skipped { reason, counts } => {
                record.failed_reason = reason.to_string();
                if let Some(counts) = counts {
                    record.apply_counts(*counts);
                }
            }
            TaskOutcome::Failed {
                reason,
                counts,
                equation,
            } => {
                record.failed_reason = reason.clone();
                record.equation = equation.clone();
                if let Some(counts) = counts {
                    record.apply_counts(*counts);
                }
            }
        }
        record
    }

    fn apply_counts(&mut self, counts: SampleCounts) {
        match counts {
            SampleCounts::Binary {
                cases,
                controls,
                total,
            } => {
                self.cases = cases;
                self.controls = controls;
                self.total_n = total;
            }
            SampleCounts::Continuous { n_observations } => {
                self.n_observations = n_observations;
            }
        }
    }

    /// True when statistic fields are all set or all at sentinel, matching status.
    pub fn is_consistent(&self) -> bool {
        let stats = [self.pval, self.beta, self.se, self.ci_low, self.ci_high];
        let has_reason = self.failed_reason != MISSING_TEXT;
        match self.status {
            OutcomeStatus::Completed => !has_reason && stats.iter().all(|v| !v.is_nan()),
            OutcomeStatus::Skipped | OutcomeStatus::Failed => {
                has_reason && stats.iter().all(|v| v.is_nan()) && !self.converged
            }
        }
    }
}

/// Tally of outcome kinds across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Completed => self.completed += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

impl FromIterator<OutcomeStatus> for OutcomeCounts {
    fn from_iter<I: IntoIterator<Item = OutcomeStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.record(status);
        }
        counts
    }
}
