//! Analysis options and run configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Study layout: one predictor against many phenotypes, or the flipped form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    Phewas,
    Flipwas,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phewas => "phewas",
            Self::Flipwas => "flipwas",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of outcome a model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// 0/1 outcome; fitness is judged by case/control counts.
    Binary,
    /// Real-valued outcome; fitness is judged by observation count.
    Continuous,
}

/// Regression model used for every task of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Firth,
    Logistic,
    Linear,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firth => "firth",
            Self::Logistic => "logistic",
            Self::Linear => "linear",
        }
    }

    pub fn outcome_kind(self) -> OutcomeKind {
        match self {
            Self::Firth | Self::Logistic => OutcomeKind::Binary,
            Self::Linear => OutcomeKind::Continuous,
        }
    }

    pub fn is_binary(self) -> bool {
        self.outcome_kind() == OutcomeKind::Binary
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Firth => "Firth logistic regression",
            Self::Logistic => "standard logistic regression",
            Self::Linear => "linear regression",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "firth" => Ok(Self::Firth),
            "logistic" => Ok(Self::Logistic),
            "linear" => Ok(Self::Linear),
            other => Err(ConfigError::UnsupportedModel {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named strategy for filling nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    Forward,
    Backward,
    Min,
    Max,
    Mean,
    Mode,
    Zero,
    One,
}

impl FillStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Min => "min",
            Self::Max => "max",
            Self::Mean => "mean",
            Self::Mode => "mode",
            Self::Zero => "zero",
            Self::One => "one",
        }
    }
}

impl FromStr for FillStrategy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "mean" => Ok(Self::Mean),
            "mode" => Ok(Self::Mode),
            "zero" => Ok(Self::Zero),
            "one" => Ok(Self::One),
            _ => Err(ConfigError::UnknownMissingStrategy {
                name: value.to_string(),
            }),
        }
    }
}

/// How nulls in the configured columns are handled before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Drop rows with any null in the configured columns.
    Drop,
    /// Fill nulls using a named strategy.
    Fill(FillStrategy),
}

impl FromStr for MissingPolicy {
    type Err = ConfigError;

    /// Accepts `drop`, `fill:<strategy>` or a bare strategy name.
    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("drop") {
            return Ok(Self::Drop);
        }
        let strategy = trimmed
            .strip_prefix("fill:")
            .unwrap_or(trimmed)
            .parse::<FillStrategy>()
            .map_err(|_| ConfigError::UnknownMissingStrategy {
                name: trimmed.to_string(),
            })?;
        Ok(Self::Fill(strategy))
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => f.write_str("drop"),
            Self::Fill(strategy) => write!(f, "fill:{}", strategy.as_str()),
        }
    }
}

/// Column-wise rescaling applied to continuous independents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContinuousTransform {
    /// `(x - mean) / std`
    Standard,
    /// `(x - min) / (max - min)`
    MinMax,
}

impl FromStr for ContinuousTransform {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "standardize" => Ok(Self::Standard),
            "min-max" | "minmax" => Ok(Self::MinMax),
            _ => Err(ConfigError::UnknownTransform {
                name: value.to_string(),
            }),
        }
    }
}

/// Sex-specific limiting options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexOptions {
    /// Column holding the sex indicator.
    pub column: Option<String>,
    /// Keep only rows whose sex equals this value.
    pub restrict_to: Option<f64>,
    /// Null out sex-inconsistent values of sex-specific dependents.
    pub phewas_filter: bool,
    /// Dependents that only apply to males.
    pub male_only: Vec<String>,
    /// Dependents that only apply to females.
    pub female_only: Vec<String>,
    pub male_code: f64,
    pub female_code: f64,
}

impl Default for SexOptions {
    fn default() -> Self {
        Self {
            column: None,
            restrict_to: None,
            phewas_filter: false,
            male_only: Vec::new(),
            female_only: Vec::new(),
            male_code: 0.0,
            female_code: 1.0,
        }
    }
}

impl SexOptions {
    pub fn is_active(&self) -> bool {
        self.restrict_to.is_some() || self.phewas_filter
    }

    pub fn validate(&self) -> Result<()> {
        if self.restrict_to.is_some() && self.phewas_filter {
            return Err(ConfigError::ConflictingSexOptions);
        }
        if self.is_active() && self.column.is_none() {
            return Err(ConfigError::MissingSexColumn);
        }
        if self.male_code == self.female_code {
            return Err(ConfigError::InvalidOption {
                option: "female-code",
                message: "male and female codes must differ".to_string(),
            });
        }
        Ok(())
    }
}

/// Options for the preprocessing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    pub sex: SexOptions,
    pub missing: Option<MissingPolicy>,
    /// Columns the missing policy applies to (covariates when unset).
    pub missing_columns: Option<Vec<String>>,
    /// Drop constant covariates instead of failing.
    pub drop_constants: bool,
    /// Columns to treat as categorical.
    pub categorical: Vec<String>,
    pub transform: Option<ContinuousTransform>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            sex: SexOptions::default(),
            missing: Some(MissingPolicy::Drop),
            missing_columns: None,
            drop_constants: true,
            categorical: Vec::new(),
            transform: None,
        }
    }
}

/// Where workers read their task columns from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Workers memory-map an on-disk IPC snapshot.
    #[default]
    Snapshot,
    /// Workers project lazily from the shared in-memory frame.
    Lazy,
}

impl ExecutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Lazy => "lazy",
        }
    }
}

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    pub mode: ExecutionMode,
    /// Number of concurrent task workers.
    pub workers: usize,
    /// Numeric threads each worker may use inside a solver call.
    pub threads_per_worker: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            workers: 1,
            threads_per_worker: 1,
        }
    }
}

/// Full configuration of one association run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub analysis: AnalysisKind,
    pub model: ModelKind,
    /// Minimum cases and controls for binary outcomes.
    pub min_cases: u64,
    /// Minimum rows for continuous outcomes.
    pub min_observations: usize,
    pub preprocess: PreprocessOptions,
    pub execution: ExecutionOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisKind::default(),
            model: ModelKind::default(),
            min_cases: 20,
            min_observations: 20,
            preprocess: PreprocessOptions::default(),
            execution: ExecutionOptions::default(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_analysis(mut self, analysis: AnalysisKind) -> Self {
        self.analysis = analysis;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_min_cases(mut self, min_cases: u64) -> Self {
        self.min_cases = min_cases;
        self
    }

    #[must_use]
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    #[must_use]
    pub fn with_preprocess(mut self, preprocess: PreprocessOptions) -> Self {
        self.preprocess = preprocess;
        self
    }

    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionOptions) -> Self {
        self.execution = execution;
        self
    }

    pub fn outcome_kind(&self) -> OutcomeKind {
        self.model.outcome_kind()
    }

    /// Check option ranges that do not depend on the input data.
    pub fn validate(&self) -> Result<()> {
        if self.execution.workers == 0 {
            return Err(ConfigError::InvalidOption {
                option: "workers",
                message: "must be at least 1".to_string(),
            });
        }
        if self.execution.threads_per_worker == 0 {
            return Err(ConfigError::InvalidOption {
                option: "threads",
                message: "must be at least 1".to_string(),
            });
        }
        self.preprocess.sex.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_missing_policies() {
        assert_eq!("drop".parse::<MissingPolicy>(), Ok(MissingPolicy::Drop));
        assert_eq!(
            "fill:mean".parse::<MissingPolicy>(),
            Ok(MissingPolicy::Fill(FillStrategy::Mean))
        );
        assert_eq!(
            "forward".parse::<MissingPolicy>(),
            Ok(MissingPolicy::Fill(FillStrategy::Forward))
        );
        assert_eq!(
            "fill:median".parse::<MissingPolicy>(),
            Err(ConfigError::UnknownMissingStrategy {
                name: "fill:median".to_string()
            })
        );
    }

    #[test]
    fn unsupported_model_is_config_error() {
        assert!(matches!(
            "probit".parse::<ModelKind>(),
            Err(ConfigError::UnsupportedModel { .. })
        ));
        assert_eq!("Linear".parse::<ModelKind>(), Ok(ModelKind::Linear));
    }

    #[test]
    fn conflicting_sex_options_rejected() {
        let sex = SexOptions {
            column: Some("sex".to_string()),
            restrict_to: Some(1.0),
            phewas_filter: true,
            ..SexOptions::default()
        };
        assert_eq!(sex.validate(), Err(ConfigError::ConflictingSexOptions));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = AnalysisConfig::default().with_execution(ExecutionOptions {
            workers: 0,
            ..ExecutionOptions::default()
        });
        assert!(config.validate().is_err());
    }
}
