use anyhow::{Context, Result};
use chrono::Utc;
use mas_core::{CancellationFlag, RunError, run_analysis};
use mas_ingest::{ColumnResolver, ReadOptions, read_column_names, read_input};
use mas_model::{
    AnalysisConfig, AnalysisKind, ConfigError, ExecutionOptions, MissingPolicy,
    PreprocessOptions, SexOptions,
};
use mas_transform::{PreprocessPipeline, Prepared};
use tracing::{info, info_span};

use crate::cli::RunArgs;
use crate::output::{output_dir, write_results, write_summary};
use crate::types::{RunPlan, RunReport, RunSummary, TopHit};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Number of hits shown in the console summary.
const TOP_HITS: usize = 10;

/// Exit code for a failed command.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RunError>() {
        Some(RunError::Interrupted) => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}

/// Check paths, read the input header and resolve every column argument.
///
/// Reads no data rows, so it doubles as the dry run.
pub fn plan_run(analysis: AnalysisKind, args: &RunArgs) -> Result<RunPlan> {
    let dir = output_dir(&args.output);
    if !dir.is_dir() {
        return Err(ConfigError::OutputDirMissing {
            path: dir.to_path_buf(),
        }
        .into());
    }
    let columns = read_column_names(&args.input)?;
    resolve_plan(analysis, args, columns)
}

/// Resolve arguments against a known input schema.
pub fn resolve_plan(
    analysis: AnalysisKind,
    args: &RunArgs,
    columns: Vec<String>,
) -> Result<RunPlan> {
    let resolver = ColumnResolver::new(columns);
    let roles = resolver.resolve_roles(
        &args.predictors,
        args.covariates.as_deref(),
        &args.dependents,
    )?;
    let missing_columns = args
        .missing_columns
        .as_deref()
        .map(|spec| resolver.resolve(spec))
        .transpose()?;
    let sex_column = args
        .sex_column
        .as_deref()
        .map(|spec| resolve_single(&resolver, spec, "sex-column"))
        .transpose()?;

    let sex = SexOptions {
        column: sex_column,
        restrict_to: args.keep_sex,
        phewas_filter: args.phewas_sex_filter,
        male_only: resolver.resolve_optional(args.male_only.as_deref())?,
        female_only: resolver.resolve_optional(args.female_only.as_deref())?,
        male_code: args.male_code,
        female_code: args.female_code,
    };
    let preprocess = PreprocessOptions {
        sex,
        missing: parse_missing(&args.missing)?,
        missing_columns,
        drop_constants: !args.no_drop_constants,
        categorical: resolver.resolve_optional(args.categorical.as_deref())?,
        transform: args.transform.map(Into::into),
    };
    let config = AnalysisConfig::default()
        .with_analysis(analysis)
        .with_model(args.model.into())
        .with_min_cases(args.min_cases)
        .with_min_observations(args.min_observations)
        .with_preprocess(preprocess)
        .with_execution(ExecutionOptions {
            mode: args.mode.into(),
            workers: args.workers,
            threads_per_worker: args.threads,
        });
    config.validate()?;

    Ok(RunPlan {
        input: args.input.clone(),
        output_prefix: args.output.clone(),
        config,
        roles,
        read_options: ReadOptions::default().with_null_values(args.null_values.clone()),
        format: args.output_format.into(),
        per_predictor: args.per_predictor,
    })
}

fn parse_missing(value: &str) -> Result<Option<MissingPolicy>, ConfigError> {
    if value.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.parse().map(Some)
}

fn resolve_single(
    resolver: &ColumnResolver,
    spec: &str,
    option: &'static str,
) -> Result<String, ConfigError> {
    let mut resolved = resolver.resolve(spec)?;
    match resolved.len() {
        1 => Ok(resolved.remove(0)),
        n => Err(ConfigError::InvalidOption {
            option,
            message: format!("expected exactly one column, got {n}"),
        }),
    }
}

/// Load, preprocess, analyse and write results for a resolved plan.
pub fn run_study(plan: RunPlan, cancel: &CancellationFlag) -> Result<RunReport> {
    let analysis = plan.config.analysis;
    let _span = info_span!("study", %analysis, input = %plan.input.display()).entered();
    let started_at = Utc::now();

    let frame = read_input(&plan.input, &plan.read_options)?;
    info!(rows = frame.height(), columns = frame.width(), "input loaded");
    if cancel.is_cancelled() {
        return Err(RunError::Interrupted.into());
    }

    let prepared = Prepared::new(
        frame,
        plan.roles.clone(),
        plan.config.preprocess.categorical.clone(),
    )?;
    let prepared = PreprocessPipeline::new(&plan.config)
        .run(prepared)
        .context("preprocessing failed")?;
    let output = run_analysis(&prepared.frame, &prepared.roles, &plan.config, cancel)?;

    let per_predictor = plan.per_predictor.then(|| prepared.roles.predictors());
    let mut outputs = write_results(
        &output.results,
        &plan.output_prefix,
        analysis,
        plan.format,
        per_predictor,
    )?;
    let summary = RunSummary {
        analysis,
        model: plan.config.model,
        input: plan.input.clone(),
        started_at,
        finished_at: Utc::now(),
        elapsed_secs: output.elapsed.as_secs_f64(),
        n_tasks: output.n_tasks,
        completed: output.counts.completed,
        skipped: output.counts.skipped,
        failed: output.counts.failed,
        outputs: outputs.clone(),
        config: plan.config.clone(),
    };
    outputs.push(write_summary(&summary, &plan.output_prefix)?);
    let top_hits = TopHit::from_results(&output.results, TOP_HITS)?;

    Ok(RunReport {
        plan,
        counts: output.counts,
        n_tasks: output.n_tasks,
        elapsed: output.elapsed,
        outputs,
        top_hits,
    })
}
