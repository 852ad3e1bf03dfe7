//! Dependent-variable validation.

use mas_model::{ConfigError, OutcomeKind};
use tracing::debug;

use crate::data_utils::{float_values, is_numeric_dtype, set_float_column};
use crate::error::Result;
use crate::prepared::Prepared;

/// Check dependents suit the outcome kind and cast them to floats.
///
/// Binary outcomes must be coded 0/1 (at most two distinct non-null values).
pub fn validate_dependents(mut prepared: Prepared, outcome: OutcomeKind) -> Result<Prepared> {
    let dependents = prepared.roles.dependents().to_vec();
    let mut non_binary = Vec::new();
    for dependent in &dependents {
        let numeric = is_numeric_dtype(prepared.frame.column(dependent)?.dtype());
        let values = float_values(&prepared.frame, dependent)?;
        if outcome == OutcomeKind::Binary
            && !(numeric && values.iter().flatten().all(|v| *v == 0.0 || *v == 1.0))
        {
            non_binary.push(dependent.clone());
            continue;
        }
        set_float_column(&mut prepared.frame, dependent, values)?;
    }
    if !non_binary.is_empty() {
        return Err(ConfigError::NonBinaryDependents {
            columns: non_binary,
        }
        .into());
    }
    debug!(dependents = dependents.len(), ?outcome, "validated dependents");
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_model::ColumnRoleSet;
    use polars::prelude::*;

    fn prepared() -> Prepared {
        let frame = df! {
            "snp" => [0.0, 1.0, 2.0],
            "case" => [Some(0i64), Some(1), None],
            "bmi" => [21.5, 30.1, 25.0],
        }
        .unwrap();
        let roles = ColumnRoleSet::new(
            vec!["snp".into()],
            Vec::new(),
            vec!["case".into(), "bmi".into()],
        )
        .unwrap();
        Prepared::new(frame, roles, Vec::new()).unwrap()
    }

    #[test]
    fn binary_mode_rejects_non_binary() {
        let err = validate_dependents(prepared(), OutcomeKind::Binary).unwrap_err();
        assert!(err.to_string().contains("bmi"));
        assert!(!err.to_string().contains("case,"));
    }

    #[test]
    fn continuous_mode_casts_to_float() {
        let out = validate_dependents(prepared(), OutcomeKind::Continuous).unwrap();
        assert_eq!(out.frame.column("case").unwrap().dtype(), &DataType::Float64);
    }
}
