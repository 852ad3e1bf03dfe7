//! Ordered preprocessing pipeline.
//!
//! Each step is a plain function over [`Prepared`]; the pipeline runs them in
//! order and re-checks role/column consistency between steps in debug builds.

use mas_model::AnalysisConfig;
use tracing::{info, info_span};

use crate::categorical::expand_categoricals;
use crate::constants::drop_constant_columns;
use crate::error::Result;
use crate::missing::handle_missing;
use crate::outcomes::validate_dependents;
use crate::prepared::Prepared;
use crate::scaling::transform_continuous;
use crate::sex::limit_sex_specific;

type Step = fn(Prepared, &AnalysisConfig) -> Result<Prepared>;

/// The preprocessing steps, in execution order.
const STEPS: &[(&str, Step)] = &[
    ("sex", |p, config| limit_sex_specific(p, &config.preprocess.sex)),
    ("missing", |p, config| match config.preprocess.missing {
        Some(policy) => handle_missing(p, policy, config.preprocess.missing_columns.as_deref()),
        None => Ok(p),
    }),
    ("constants", |p, config| {
        drop_constant_columns(p, config.preprocess.drop_constants)
    }),
    ("categorical", |p, _| expand_categoricals(p)),
    ("transform", |p, config| match config.preprocess.transform {
        Some(transform) => transform_continuous(p, transform),
        None => Ok(p),
    }),
    ("outcome", |p, config| validate_dependents(p, config.outcome_kind())),
];

/// Runs the preprocessing steps for one analysis configuration.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessPipeline<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> PreprocessPipeline<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Names of the steps in execution order.
    pub fn step_names() -> impl Iterator<Item = &'static str> {
        STEPS.iter().map(|(name, _)| *name)
    }

    pub fn run(&self, input: Prepared) -> Result<Prepared> {
        input.check_consistency()?;
        let rows = input.frame.height();
        let mut prepared = input;
        for (name, step) in STEPS {
            let _span = info_span!("preprocess", step = *name).entered();
            prepared = step(prepared, self.config)?;
            if cfg!(debug_assertions) {
                prepared.check_consistency()?;
            }
        }
        info!(
            rows_before = rows,
            rows_after = prepared.frame.height(),
            predictors = prepared.roles.predictors().len(),
            covariates = prepared.roles.covariates().len(),
            dependents = prepared.roles.dependents().len(),
            "preprocessing complete"
        );
        Ok(prepared)
    }
}
