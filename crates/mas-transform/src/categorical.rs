//! Drop-first indicator expansion of categorical independents.

use std::cmp::Ordering;

use mas_model::ConfigError;
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::{debug, info};

use crate::data_utils::{distinct_non_null, format_level, has_column, is_numeric_dtype};
use crate::error::Result;
use crate::prepared::Prepared;

/// Expand every categorical column with more than two levels.
///
/// A column with `k` sorted levels becomes `k - 1` indicators named
/// `<column>_<level>` (the first level is the reference). Rows where the
/// source is null are null in every indicator. Numeric binary categoricals
/// are kept unchanged; a text column with two levels becomes one indicator.
pub fn expand_categoricals(mut prepared: Prepared) -> Result<Prepared> {
    let categorical = prepared.categorical.clone();
    for column in &categorical {
        if !has_column(&prepared.frame, column) {
            return Err(ConfigError::UnknownColumn {
                name: column.clone(),
            }
            .into());
        }
        let numeric = is_numeric_dtype(prepared.frame.column(column)?.dtype());
        if numeric && distinct_non_null(&prepared.frame, column)? <= 2 {
            debug!(column = %column, "binary categorical kept as is");
            continue;
        }
        prepared = expand_column(prepared, column)?;
    }
    Ok(prepared)
}

fn expand_column(prepared: Prepared, column: &str) -> Result<Prepared> {
    let labels = level_labels(&prepared.frame, column)?;
    let mut levels: Vec<Level> = Vec::new();
    for label in labels.iter().flatten() {
        if !levels.iter().any(|level| level.label == label.label) {
            levels.push(label.clone());
        }
    }
    levels.sort_by(Level::order);

    let mut frame = prepared.frame;
    let mut indicators = Vec::with_capacity(levels.len().saturating_sub(1));
    for level in levels.iter().skip(1) {
        let name = format!("{column}_{}", level.label);
        if has_column(&frame, &name) {
            return Err(ConfigError::InvalidOption {
                option: "categorical",
                message: format!("indicator column {name} already exists in the dataset"),
            }
            .into());
        }
        let values: Vec<Option<f64>> = labels
            .iter()
            .map(|value| {
                value
                    .as_ref()
                    .map(|value| if value.label == level.label { 1.0 } else { 0.0 })
            })
            .collect();
        frame.with_column(Series::new(name.as_str().into(), values))?;
        indicators.push(name);
    }
    let frame = frame.drop(column)?;
    let roles = prepared.roles.replace(column, &indicators)?;
    let mut categorical = Vec::with_capacity(prepared.categorical.len() + indicators.len());
    for name in prepared.categorical {
        if name == column {
            categorical.extend(indicators.iter().cloned());
        } else {
            categorical.push(name);
        }
    }
    info!(
        column,
        levels = levels.len(),
        reference = %levels.first().map(|level| level.label.as_str()).unwrap_or_default(),
        "expanded categorical column"
    );
    Ok(Prepared {
        frame,
        roles,
        categorical,
    })
}

#[derive(Debug, Clone)]
struct Level {
    label: String,
    numeric: Option<f64>,
}

impl Level {
    fn order(a: &Self, b: &Self) -> Ordering {
        match (a.numeric, b.numeric) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.label.cmp(&b.label),
        }
    }
}

/// Per-row level of a column; `None` for null rows.
fn level_labels(df: &DataFrame, column: &str) -> Result<Vec<Option<Level>>> {
    let series = df.column(column)?.as_materialized_series().rechunk();
    let numeric = is_numeric_dtype(series.dtype());
    let mut labels = Vec::with_capacity(series.len());
    for value in series.iter() {
        let level = match value {
            AnyValue::Null => None,
            value if numeric => value.extract::<f64>().map(|number| Level {
                label: format_level(number),
                numeric: Some(number),
            }),
            AnyValue::String(text) => Some(Level {
                label: text.to_string(),
                numeric: None,
            }),
            AnyValue::StringOwned(text) => Some(Level {
                label: text.to_string(),
                numeric: None,
            }),
            other => Some(Level {
                label: other.to_string(),
                numeric: None,
            }),
        };
        labels.push(level);
    }
    Ok(labels)
}
