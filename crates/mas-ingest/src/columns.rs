//! Column selection mini-language.
//!
//! A selection is a comma-separated list where each entry is one of:
//!
//! - a literal column name
//! - `i:<idx>`: a single zero-based index
//! - `i:<start>-<end>`: a half-open index range
//! - `i:<start>-`: every column from `start` to the end
//!
//! ```
//! use mas_ingest::ColumnResolver;
//!
//! let resolver = ColumnResolver::new(vec!["id".into(), "age".into(), "sex".into(), "y".into()]);
//! assert_eq!(resolver.resolve("i:1-3").unwrap(), vec!["age", "sex"]);
//! assert_eq!(resolver.resolve("y,i:0").unwrap(), vec!["y", "id"]);
//! assert_eq!(resolver.resolve("i:2-").unwrap(), vec!["sex", "y"]);
//! ```

use std::collections::HashSet;

use mas_model::{ColumnRoleSet, ConfigError, Result};

const INDEX_PREFIX: &str = "i:";

/// Resolves column selections against a known schema.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    names: Vec<String>,
    known: HashSet<String>,
}

impl ColumnResolver {
    pub fn new(names: Vec<String>) -> Self {
        let known = names.iter().cloned().collect();
        Self { names, known }
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Resolve a selection into concrete column names.
    ///
    /// Duplicates are removed, keeping the first occurrence.
    pub fn resolve(&self, spec: &str) -> Result<Vec<String>> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            for name in self.resolve_entry(entry)? {
                if seen.insert(name.clone()) {
                    resolved.push(name);
                }
            }
        }
        Ok(resolved)
    }

    /// Resolve an optional selection; `None` yields no columns.
    pub fn resolve_optional(&self, spec: Option<&str>) -> Result<Vec<String>> {
        spec.map_or_else(|| Ok(Vec::new()), |spec| self.resolve(spec))
    }

    /// Resolve the three role selections into a disjoint role set.
    pub fn resolve_roles(
        &self,
        predictors: &str,
        covariates: Option<&str>,
        dependents: &str,
    ) -> Result<ColumnRoleSet> {
        let predictors = self.resolve(predictors)?;
        if predictors.is_empty() {
            return Err(ConfigError::EmptyRole { role: "predictor" });
        }
        let dependents = self.resolve(dependents)?;
        if dependents.is_empty() {
            return Err(ConfigError::EmptyRole { role: "dependent" });
        }
        let covariates = self.resolve_optional(covariates)?;
        ColumnRoleSet::new(predictors, covariates, dependents)
    }

    fn resolve_entry(&self, entry: &str) -> Result<Vec<String>> {
        match entry.strip_prefix(INDEX_PREFIX) {
            Some(indices) => self.resolve_indices(entry, indices),
            None if self.known.contains(entry) => Ok(vec![entry.to_string()]),
            None => Err(ConfigError::UnknownColumn {
                name: entry.to_string(),
            }),
        }
    }

    fn resolve_indices(&self, entry: &str, indices: &str) -> Result<Vec<String>> {
        let n_columns = self.n_columns();
        let invalid = || ConfigError::InvalidIndexSpec {
            spec: entry.to_string(),
        };

        if !indices.is_empty() && indices.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = indices.parse().map_err(|_| invalid())?;
            if index >= n_columns {
                return Err(ConfigError::IndexOutOfRange { index, n_columns });
            }
            return Ok(vec![self.names[index].clone()]);
        }

        let Some((start, end)) = indices.split_once('-') else {
            return Err(invalid());
        };
        let start: usize = start.parse().map_err(|_| invalid())?;
        let end: usize = if end.is_empty() {
            n_columns
        } else {
            end.parse().map_err(|_| invalid())?
        };
        if start >= n_columns {
            return Err(ConfigError::IndexOutOfRange {
                index: start,
                n_columns,
            });
        }
        if end > n_columns {
            return Err(ConfigError::RangeEndOutOfRange {
                start,
                end,
                n_columns,
            });
        }
        if start > end {
            return Err(invalid());
        }
        Ok(self.names[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ColumnResolver {
        ColumnResolver::new(
            ["id", "snp", "age", "sex", "pc1", "250.2", "401.1"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        )
    }

    #[test]
    fn resolves_names_and_indices() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("snp").unwrap(), vec!["snp"]);
        assert_eq!(resolver.resolve("i:1").unwrap(), vec!["snp"]);
        assert_eq!(
            resolver.resolve("i:2-5").unwrap(),
            vec!["age", "sex", "pc1"]
        );
        assert_eq!(resolver.resolve("i:5-").unwrap(), vec!["250.2", "401.1"]);
    }

    #[test]
    fn mixed_entries_keep_order_and_drop_duplicates() {
        assert_eq!(
            resolver().resolve("sex, i:2-4 ,age").unwrap(),
            vec!["sex", "age"]
        );
    }

    #[test]
    fn unknown_column_is_config_error() {
        assert_eq!(
            resolver().resolve("bmi"),
            Err(ConfigError::UnknownColumn {
                name: "bmi".to_string()
            })
        );
    }

    #[test]
    fn out_of_range_indices_rejected() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("i:7"),
            Err(ConfigError::IndexOutOfRange {
                index: 7,
                n_columns: 7
            })
        );
        assert_eq!(
            resolver.resolve("i:2-9"),
            Err(ConfigError::RangeEndOutOfRange {
                start: 2,
                end: 9,
                n_columns: 7
            })
        );
        assert!(matches!(
            resolver.resolve("i:a-b"),
            Err(ConfigError::InvalidIndexSpec { .. })
        ));
        assert!(matches!(
            resolver.resolve("i:"),
            Err(ConfigError::InvalidIndexSpec { .. })
        ));
    }

    #[test]
    fn role_overlap_detected() {
        let err = resolver()
            .resolve_roles("snp", Some("i:1-3"), "i:5-")
            .expect_err("snp is both predictor and covariate");
        assert!(matches!(err, ConfigError::OverlappingRoles { .. }));
    }

    #[test]
    fn empty_dependents_rejected() {
        let err = resolver().resolve_roles("snp", None, " ").expect_err("empty");
        assert_eq!(err, ConfigError::EmptyRole { role: "dependent" });
    }
}
