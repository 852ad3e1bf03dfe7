//! Constant-column pruning.
//!
//! A column is constant when it has at most one distinct non-null value.

use mas_model::{ConfigError, Role};
use polars::prelude::{DataFrame, PolarsResult};
use tracing::info;

use crate::data_utils::distinct_non_null;
use crate::error::Result;
use crate::prepared::Prepared;

/// Names of the `candidates` that are constant in `df`, in candidate order.
pub fn constant_columns(df: &DataFrame, candidates: &[String]) -> PolarsResult<Vec<String>> {
    let mut constants = Vec::new();
    for column in candidates {
        if distinct_non_null(df, column)? <= 1 {
            constants.push(column.clone());
        }
    }
    Ok(constants)
}

/// Drop constant covariates, failing on constant predictors or dependents.
///
/// With `drop_constants` disabled every constant role column is an error.
/// Running this twice is the same as running it once.
pub fn drop_constant_columns(prepared: Prepared, drop_constants: bool) -> Result<Prepared> {
    let constants = constant_columns(&prepared.frame, &prepared.roles.all_columns())?;
    if constants.is_empty() {
        info!("no constant columns found");
        return Ok(prepared);
    }
    let fatal: Vec<String> = if drop_constants {
        constants
            .iter()
            .filter(|column| prepared.roles.role_of(column) != Some(Role::Covariate))
            .cloned()
            .collect()
    } else {
        constants.clone()
    };
    if !fatal.is_empty() {
        return Err(ConfigError::ConstantColumns { columns: fatal }.into());
    }
    info!(columns = %constants.join(","), "dropping constant covariates");
    prepared.drop_columns(&constants)
}
