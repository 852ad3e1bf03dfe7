//! CLI argument definitions for `polars-mas`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use mas_model::{AnalysisKind, ContinuousTransform, ExecutionMode, ModelKind};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "polars-mas",
    version,
    about = "Multiple association studies (PheWAS / FlipWAS) over a single table",
    long_about = "Fit one regression per (predictor, dependent) pair over a tabular dataset.\n\n\
                  Supports Firth-penalized logistic, standard logistic and linear models.\n\
                  Results are written as one table ranked by p-value."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// One or more predictors against many phenotype outcomes.
    Phewas(RunArgs),

    /// Phenotypes as predictors against one or more outcomes.
    Flipwas(RunArgs),
}

impl Command {
    pub fn analysis(&self) -> AnalysisKind {
        match self {
            Self::Phewas(_) => AnalysisKind::Phewas,
            Self::Flipwas(_) => AnalysisKind::Flipwas,
        }
    }

    pub fn args(&self) -> &RunArgs {
        match self {
            Self::Phewas(args) | Self::Flipwas(args) => args,
        }
    }
}

/// Arguments shared by both analysis modes.
///
/// Column arguments accept names and `i:<idx>`, `i:<start>-<end>` or
/// `i:<start>-` index selections, comma separated.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Input table (.parquet, .csv, .tsv or tab-delimited .txt).
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Output prefix; the analysis name and format suffix are appended.
    #[arg(short = 'o', long = "output", value_name = "PREFIX")]
    pub output: PathBuf,

    /// Predictor columns.
    #[arg(short = 'p', long = "predictors", value_name = "COLS")]
    pub predictors: String,

    /// Dependent (outcome) columns.
    #[arg(short = 'd', long = "dependents", value_name = "COLS")]
    pub dependents: String,

    /// Covariate columns.
    #[arg(short = 'c', long = "covariates", value_name = "COLS")]
    pub covariates: Option<String>,

    /// Columns to expand into indicator columns.
    #[arg(long = "categorical", value_name = "COLS")]
    pub categorical: Option<String>,

    /// Regression model fitted for every pair.
    #[arg(short = 'm', long = "model", value_enum, default_value = "firth")]
    pub model: ModelArg,

    /// Missing-value handling: drop, fill:<strategy>, or none.
    #[arg(long = "missing", value_name = "POLICY", default_value = "drop")]
    pub missing: String,

    /// Columns the missing-value policy applies to (default: covariates).
    #[arg(long = "missing-columns", value_name = "COLS")]
    pub missing_columns: Option<String>,

    /// Fail on constant covariates instead of dropping them.
    #[arg(long = "no-drop-constants")]
    pub no_drop_constants: bool,

    /// Rescale continuous predictors and covariates.
    #[arg(long = "transform", value_enum)]
    pub transform: Option<TransformArg>,

    /// Minimum cases and controls for binary outcomes.
    #[arg(long = "min-cases", default_value_t = 20)]
    pub min_cases: u64,

    /// Minimum rows for continuous outcomes.
    #[arg(long = "min-observations", default_value_t = 20)]
    pub min_observations: usize,

    /// Column holding the sex indicator.
    #[arg(long = "sex-column", value_name = "COL")]
    pub sex_column: Option<String>,

    /// Keep only rows with this sex code.
    #[arg(long = "keep-sex", value_name = "CODE", conflicts_with = "phewas_sex_filter")]
    pub keep_sex: Option<f64>,

    /// Null out sex-inconsistent values of sex-specific dependents.
    #[arg(long = "phewas-sex-filter")]
    pub phewas_sex_filter: bool,

    /// Dependents that only apply to males.
    #[arg(long = "male-only", value_name = "COLS")]
    pub male_only: Option<String>,

    /// Dependents that only apply to females.
    #[arg(long = "female-only", value_name = "COLS")]
    pub female_only: Option<String>,

    /// Code used for males in the sex column.
    #[arg(long = "male-code", default_value_t = 0.0)]
    pub male_code: f64,

    /// Code used for females in the sex column.
    #[arg(long = "female-code", default_value_t = 1.0)]
    pub female_code: f64,

    /// Extra tokens read as null in text inputs.
    #[arg(long = "null-values", value_name = "TOKENS", value_delimiter = ',')]
    pub null_values: Vec<String>,

    /// Number of concurrent task workers.
    #[arg(short = 'n', long = "workers", default_value_t = 1)]
    pub workers: usize,

    /// Numeric threads per worker.
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Where workers read task columns from.
    #[arg(long = "mode", value_enum, default_value = "snapshot")]
    pub mode: ModeArg,

    /// Result table format.
    #[arg(long = "output-format", value_enum, default_value = "csv")]
    pub output_format: OutputFormatArg,

    /// Also write one result file per predictor.
    #[arg(long = "per-predictor")]
    pub per_predictor: bool,

    /// Validate the configuration and print a summary without reading data.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModelArg {
    Firth,
    Logistic,
    Linear,
}

impl From<ModelArg> for ModelKind {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::Firth => Self::Firth,
            ModelArg::Logistic => Self::Logistic,
            ModelArg::Linear => Self::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransformArg {
    Standard,
    MinMax,
}

impl From<TransformArg> for ContinuousTransform {
    fn from(value: TransformArg) -> Self {
        match value {
            TransformArg::Standard => Self::Standard,
            TransformArg::MinMax => Self::MinMax,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Snapshot,
    Lazy,
}

impl From<ModeArg> for ExecutionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Snapshot => Self::Snapshot,
            ModeArg::Lazy => Self::Lazy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Tsv,
    Parquet,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => Self::Csv,
            OutputFormatArg::Tsv => Self::Tsv,
            OutputFormatArg::Parquet => Self::Parquet,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
