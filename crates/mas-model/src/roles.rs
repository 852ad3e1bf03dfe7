//! Column role assignment for an association study.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Role a column plays in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Predictor,
    Covariate,
    Dependent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Predictor => "predictor",
            Self::Covariate => "covariate",
            Self::Dependent => "dependent",
        }
    }
}

/// Three disjoint, ordered lists of column names.
///
/// Values are never mutated through a shared reference: every transform that
/// changes roles builds and returns a new set, so a caller holding an older
/// set never observes a half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoleSet {
    predictors: Vec<String>,
    covariates: Vec<String>,
    dependents: Vec<String>,
}

impl ColumnRoleSet {
    /// Build a role set, rejecting any column assigned to more than one role.
    pub fn new(
        predictors: Vec<String>,
        covariates: Vec<String>,
        dependents: Vec<String>,
    ) -> Result<Self> {
        let roles = Self {
            predictors,
            covariates,
            dependents,
        };
        roles.validate_disjoint()?;
        Ok(roles)
    }

    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    pub fn covariates(&self) -> &[String] {
        &self.covariates
    }

    pub fn dependents(&self) -> &[String] {
        &self.dependents
    }

    /// Check pairwise disjointness of the three lists.
    pub fn validate_disjoint(&self) -> Result<()> {
        let pairs = [
            (Role::Predictor, &self.predictors, Role::Dependent, &self.dependents),
            (Role::Predictor, &self.predictors, Role::Covariate, &self.covariates),
            (Role::Dependent, &self.dependents, Role::Covariate, &self.covariates),
        ];
        for (first, left, second, right) in pairs {
            let left: BTreeSet<&String> = left.iter().collect();
            let shared: Vec<String> = right
                .iter()
                .filter(|name| left.contains(name))
                .cloned()
                .collect();
            if !shared.is_empty() {
                return Err(ConfigError::OverlappingRoles {
                    first: first.as_str(),
                    second: second.as_str(),
                    columns: shared,
                });
            }
        }
        Ok(())
    }

    /// Role of a column, if it has one.
    pub fn role_of(&self, column: &str) -> Option<Role> {
        if self.predictors.iter().any(|name| name == column) {
            Some(Role::Predictor)
        } else if self.covariates.iter().any(|name| name == column) {
            Some(Role::Covariate)
        } else if self.dependents.iter().any(|name| name == column) {
            Some(Role::Dependent)
        } else {
            None
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.role_of(column).is_some()
    }

    /// All role columns in predictor, covariate, dependent order.
    pub fn all_columns(&self) -> Vec<String> {
        self.predictors
            .iter()
            .chain(&self.covariates)
            .chain(&self.dependents)
            .cloned()
            .collect()
    }

    /// Predictors followed by covariates (the independent side of the model).
    pub fn independents(&self) -> Vec<String> {
        self.predictors
            .iter()
            .chain(&self.covariates)
            .cloned()
            .collect()
    }

    /// Copy of this set with `column` removed from every list.
    #[must_use]
    pub fn without(&self, column: &str) -> Self {
        let keep = |names: &[String]| -> Vec<String> {
            names.iter().filter(|name| *name != column).cloned().collect()
        };
        Self {
            predictors: keep(&self.predictors),
            covariates: keep(&self.covariates),
            dependents: keep(&self.dependents),
        }
    }

    /// Copy of this set with every listed column removed.
    #[must_use]
    pub fn without_all(&self, columns: &[String]) -> Self {
        columns
            .iter()
            .fold(self.clone(), |roles, column| roles.without(column))
    }

    /// Copy of this set with `column` replaced, in place, by `replacements`.
    ///
    /// Relative order of every other column is preserved. Fails when a
    /// replacement name already has a role.
    pub fn replace(&self, column: &str, replacements: &[String]) -> Result<Self> {
        let splice = |names: &[String]| -> Vec<String> {
            let mut out = Vec::with_capacity(names.len() + replacements.len());
            for name in names {
                if name == column {
                    out.extend(replacements.iter().cloned());
                } else {
                    out.push(name.clone());
                }
            }
            out
        };
        let roles = Self {
            predictors: splice(&self.predictors),
            covariates: splice(&self.covariates),
            dependents: splice(&self.dependents),
        };
        roles.validate_disjoint()?;
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn rejects_overlap_between_predictors_and_covariates() {
        let err = ColumnRoleSet::new(names(&["a"]), names(&["a", "b"]), names(&["y"]))
            .expect_err("overlap");
        assert_eq!(
            err,
            ConfigError::OverlappingRoles {
                first: "predictor",
                second: "covariate",
                columns: names(&["a"]),
            }
        );
    }

    #[test]
    fn replace_splices_in_place() {
        let roles =
            ColumnRoleSet::new(names(&["p"]), names(&["age", "race", "sex"]), names(&["y"]))
                .unwrap();
        let replaced = roles
            .replace("race", &names(&["race_2", "race_3"]))
            .unwrap();
        assert_eq!(replaced.covariates(), names(&["age", "race_2", "race_3", "sex"]));
        assert_eq!(roles.covariates(), names(&["age", "race", "sex"]));
    }

    #[test]
    fn without_removes_from_every_list() {
        let roles =
            ColumnRoleSet::new(names(&["p"]), names(&["sex", "age"]), names(&["y1", "y2"]))
                .unwrap();
        let trimmed = roles.without("sex");
        assert_eq!(trimmed.covariates(), names(&["age"]));
        assert_eq!(trimmed.role_of("sex"), None);
        assert_eq!(trimmed.role_of("y2"), Some(Role::Dependent));
    }
}
