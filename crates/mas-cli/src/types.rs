use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mas_ingest::ReadOptions;
use mas_model::{
    AnalysisConfig, AnalysisKind, ColumnRoleSet, ModelKind, OutcomeCounts, OutcomeStatus,
};
use polars::prelude::{DataFrame, PolarsResult};
use serde::Serialize;

use crate::output::OutputFormat;

/// A fully resolved run: configuration plus concrete column roles.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub input: PathBuf,
    pub output_prefix: PathBuf,
    pub config: AnalysisConfig,
    pub roles: ColumnRoleSet,
    pub read_options: ReadOptions,
    pub format: OutputFormat,
    pub per_predictor: bool,
}

/// What a finished run reports back to the console.
#[derive(Debug)]
pub struct RunReport {
    pub plan: RunPlan,
    pub counts: OutcomeCounts,
    pub n_tasks: usize,
    pub elapsed: Duration,
    pub outputs: Vec<PathBuf>,
    pub top_hits: Vec<TopHit>,
}

/// One row of the console top-hits table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopHit {
    pub predictor: String,
    pub dependent: String,
    pub pval: f64,
    pub beta: f64,
}

impl TopHit {
    /// First `limit` completed rows of a sorted result table.
    pub fn from_results(results: &DataFrame, limit: usize) -> PolarsResult<Vec<Self>> {
        let predictors = results.column("predictor")?.str()?;
        let dependents = results.column("dependent")?.str()?;
        let statuses = results.column("status")?.str()?;
        let pvals = results.column("pval")?.f64()?;
        let betas = results.column("beta")?.f64()?;
        let hits = (0..results.height())
            .filter(|&row| statuses.get(row) == Some(OutcomeStatus::Completed.as_str()))
            .take(limit)
            .map(|row| Self {
                predictor: predictors.get(row).unwrap_or_default().to_string(),
                dependent: dependents.get(row).unwrap_or_default().to_string(),
                pval: pvals.get(row).unwrap_or(f64::NAN),
                beta: betas.get(row).unwrap_or(f64::NAN),
            })
            .collect();
        Ok(hits)
    }
}

/// Machine-readable record of a run, written next to the results.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub analysis: AnalysisKind,
    pub model: ModelKind,
    pub input: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub n_tasks: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outputs: Vec<PathBuf>,
    pub config: AnalysisConfig,
}
