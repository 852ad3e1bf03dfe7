//! The dataset threaded through the preprocessing pipeline.

use mas_model::{ColumnRoleSet, ConfigError, Role};
use polars::prelude::DataFrame;

use crate::data_utils::has_column;
use crate::error::Result;

/// A dataset together with its column roles and categorical markers.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub frame: DataFrame,
    pub roles: ColumnRoleSet,
    /// Predictor or covariate columns treated as categorical.
    pub categorical: Vec<String>,
}

impl Prepared {
    /// Bundle a frame with its roles, checking both agree.
    pub fn new(frame: DataFrame, roles: ColumnRoleSet, categorical: Vec<String>) -> Result<Self> {
        let prepared = Self {
            frame,
            roles,
            categorical,
        };
        prepared.check_consistency()?;
        Ok(prepared)
    }

    /// Verify every role column exists, roles are disjoint and every
    /// categorical column is an independent.
    pub fn check_consistency(&self) -> Result<()> {
        self.roles.validate_disjoint()?;
        for column in self.roles.all_columns() {
            if !has_column(&self.frame, &column) {
                return Err(ConfigError::UnknownColumn { name: column }.into());
            }
        }
        for column in &self.categorical {
            match self.roles.role_of(column) {
                Some(Role::Predictor | Role::Covariate) => {}
                _ => {
                    return Err(ConfigError::CategoricalWithoutRole {
                        name: column.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|name| name == column)
    }

    /// Remove columns from the frame, the role lists and the categorical set.
    pub(crate) fn drop_columns(self, columns: &[String]) -> Result<Self> {
        if columns.is_empty() {
            return Ok(self);
        }
        let present: Vec<String> = columns
            .iter()
            .filter(|name| has_column(&self.frame, name))
            .cloned()
            .collect();
        let frame = crate::data_utils::drop_columns(&self.frame, &present)?;
        Ok(Self {
            frame,
            roles: self.roles.without_all(columns),
            categorical: self
                .categorical
                .into_iter()
                .filter(|name| !columns.contains(name))
                .collect(),
        })
    }
}
