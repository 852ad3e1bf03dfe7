//! Sex-specific limiting.
//!
//! Two mutually exclusive modes:
//!
//! - **restrict**: keep only rows of one sex, then drop the sex column from
//!   every role list since it is constant afterwards
//! - **PheWAS filter**: null out male-only dependents on female rows and
//!   female-only dependents on male rows

use mas_model::{ConfigError, SexOptions};
use polars::prelude::{BooleanChunked, NewChunkedArray};
use tracing::{info, warn};

use crate::data_utils::{float_values, has_column, set_float_column};
use crate::error::Result;
use crate::prepared::Prepared;

/// Apply the configured sex-specific limiting, if any.
pub fn limit_sex_specific(prepared: Prepared, options: &SexOptions) -> Result<Prepared> {
    if !options.is_active() {
        return Ok(prepared);
    }
    options.validate()?;
    let Some(column) = options.column.as_deref() else {
        return Err(ConfigError::MissingSexColumn.into());
    };
    if !has_column(&prepared.frame, column) {
        return Err(ConfigError::UnknownColumn {
            name: column.to_string(),
        }
        .into());
    }
    match options.restrict_to {
        Some(value) => restrict(prepared, column, value),
        None => phewas_filter(prepared, column, options),
    }
}

fn restrict(prepared: Prepared, column: &str, value: f64) -> Result<Prepared> {
    let before = prepared.frame.height();
    let keep: Vec<bool> = float_values(&prepared.frame, column)?
        .into_iter()
        .map(|sex| sex == Some(value))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let frame = prepared.frame.filter(&mask)?;
    info!(
        column,
        value,
        rows_before = before,
        rows_after = frame.height(),
        "restricted dataset to one sex"
    );
    let column = column.to_string();
    Ok(Prepared {
        frame,
        roles: prepared.roles.without(&column),
        categorical: prepared
            .categorical
            .into_iter()
            .filter(|name| *name != column)
            .collect(),
    })
}

fn phewas_filter(mut prepared: Prepared, column: &str, options: &SexOptions) -> Result<Prepared> {
    let sex = float_values(&prepared.frame, column)?;
    let groups = [
        (&options.male_only, options.female_code, "male-only"),
        (&options.female_only, options.male_code, "female-only"),
    ];
    for (dependents, excluded_code, label) in groups {
        for dependent in dependents {
            if !prepared.roles.dependents().contains(dependent) {
                continue;
            }
            let values = float_values(&prepared.frame, dependent)?;
            let mismatched = values
                .iter()
                .zip(&sex)
                .filter(|(value, sex)| **value == Some(1.0) && **sex == Some(excluded_code))
                .count();
            if mismatched > 0 {
                warn!(
                    dependent = %dependent,
                    mismatched,
                    "{label} phenotype recorded as a case on {mismatched} rows of the other sex"
                );
            }
            let filtered: Vec<Option<f64>> = values
                .into_iter()
                .zip(&sex)
                .map(|(value, sex)| {
                    if *sex == Some(excluded_code) {
                        None
                    } else {
                        value
                    }
                })
                .collect();
            set_float_column(&mut prepared.frame, dependent, filtered)?;
        }
    }
    info!(
        male_only = options.male_only.len(),
        female_only = options.female_only.len(),
        "applied PheWAS sex filter"
    );
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_model::ColumnRoleSet;
    use polars::prelude::*;

    fn prepared() -> Prepared {
        let frame = df! {
            "snp" => [0.0, 1.0, 2.0, 1.0],
            "sex" => [0.0, 1.0, 0.0, 1.0],
            "prostate" => [1.0, 1.0, 0.0, 0.0],
            "ovary" => [0.0, 1.0, 1.0, 0.0],
        }
        .unwrap();
        let roles = ColumnRoleSet::new(
            vec!["snp".into()],
            vec!["sex".into()],
            vec!["prostate".into(), "ovary".into()],
        )
        .unwrap();
        Prepared::new(frame, roles, Vec::new()).unwrap()
    }

    #[test]
    fn restrict_keeps_one_sex_and_drops_column_role() {
        let options = SexOptions {
            column: Some("sex".into()),
            restrict_to: Some(1.0),
            ..SexOptions::default()
        };
        let out = limit_sex_specific(prepared(), &options).unwrap();
        assert_eq!(out.frame.height(), 2);
        assert!(out.roles.covariates().is_empty());
        out.check_consistency().unwrap();
    }

    #[test]
    fn phewas_filter_nulls_other_sex() {
        let options = SexOptions {
            column: Some("sex".into()),
            phewas_filter: true,
            male_only: vec!["prostate".into()],
            female_only: vec!["ovary".into()],
            ..SexOptions::default()
        };
        let out = limit_sex_specific(prepared(), &options).unwrap();
        assert_eq!(out.frame.height(), 4);
        assert_eq!(out.frame.column("prostate").unwrap().null_count(), 2);
        assert_eq!(out.frame.column("ovary").unwrap().null_count(), 2);
    }

    #[test]
    fn both_modes_conflict() {
        let options = SexOptions {
            column: Some("sex".into()),
            restrict_to: Some(0.0),
            phewas_filter: true,
            ..SexOptions::default()
        };
        let err = limit_sex_specific(prepared(), &options).unwrap_err();
        assert!(matches!(
            err,
            crate::TransformError::Config(ConfigError::ConflictingSexOptions)
        ));
    }

    #[test]
    fn unknown_sex_column_rejected() {
        let options = SexOptions {
            column: Some("gender".into()),
            restrict_to: Some(0.0),
            ..SexOptions::default()
        };
        let err = limit_sex_specific(prepared(), &options).unwrap_err();
        assert!(matches!(
            err,
            crate::TransformError::Config(ConfigError::UnknownColumn { .. })
        ));
    }
}
