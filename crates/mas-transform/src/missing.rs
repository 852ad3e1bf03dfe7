//! Missing-value handling over a configured column set.

use mas_model::{ConfigError, FillStrategy, MissingPolicy};
use polars::prelude::{DataFrame, FillNullStrategy};
use tracing::info;

use crate::data_utils::{float_values, has_column, is_numeric_dtype, set_float_column};
use crate::error::Result;
use crate::prepared::Prepared;

/// Apply `policy` to `columns`, defaulting to the covariates.
pub fn handle_missing(
    mut prepared: Prepared,
    policy: MissingPolicy,
    columns: Option<&[String]>,
) -> Result<Prepared> {
    let columns: Vec<String> = match columns {
        Some(columns) => columns.to_vec(),
        None => prepared.roles.covariates().to_vec(),
    };
    if columns.is_empty() {
        return Ok(prepared);
    }
    for column in &columns {
        if !has_column(&prepared.frame, column) {
            return Err(ConfigError::UnknownColumn {
                name: column.clone(),
            }
            .into());
        }
    }
    match policy {
        MissingPolicy::Drop => {
            let before = prepared.frame.height();
            prepared.frame = prepared.frame.drop_nulls(Some(columns.as_slice()))?;
            info!(
                dropped = before - prepared.frame.height(),
                rows = prepared.frame.height(),
                "dropped rows with missing values"
            );
        }
        MissingPolicy::Fill(strategy) => {
            for column in &columns {
                fill_column(&mut prepared.frame, column, strategy)?;
            }
            info!(
                strategy = strategy.as_str(),
                columns = columns.len(),
                "filled missing values"
            );
        }
    }
    Ok(prepared)
}

fn fill_column(df: &mut DataFrame, column: &str, strategy: FillStrategy) -> Result<()> {
    let series = df.column(column)?.as_materialized_series().clone();
    if series.null_count() == 0 {
        return Ok(());
    }
    match strategy {
        FillStrategy::Forward | FillStrategy::Backward => {
            let fill = if strategy == FillStrategy::Forward {
                FillNullStrategy::Forward(None)
            } else {
                FillNullStrategy::Backward(None)
            };
            let filled = series.fill_null(fill)?;
            df.with_column(filled)?;
        }
        _ => {
            if !is_numeric_dtype(series.dtype()) {
                return Err(ConfigError::InvalidOption {
                    option: "missing",
                    message: format!(
                        "fill:{} needs a numeric column, {column} is {}",
                        strategy.as_str(),
                        series.dtype()
                    ),
                }
                .into());
            }
            let values = float_values(df, column)?;
            if let Some(fill) = fill_value(&values, strategy) {
                let filled = values.into_iter().map(|v| v.or(Some(fill))).collect();
                set_float_column(df, column, filled)?;
            }
        }
    }
    Ok(())
}

/// Scalar used to fill nulls; `None` when the column has no observed values.
fn fill_value(values: &[Option<f64>], strategy: FillStrategy) -> Option<f64> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    match strategy {
        FillStrategy::Zero => Some(0.0),
        FillStrategy::One => Some(1.0),
        _ if observed.is_empty() => None,
        FillStrategy::Min => observed.iter().copied().reduce(f64::min),
        FillStrategy::Max => observed.iter().copied().reduce(f64::max),
        FillStrategy::Mean => Some(observed.iter().sum::<f64>() / observed.len() as f64),
        FillStrategy::Mode => mode(&observed),
        FillStrategy::Forward | FillStrategy::Backward => None,
    }
}

/// Most frequent value; ties resolve to the smallest.
fn mode(observed: &[f64]) -> Option<f64> {
    let mut sorted = observed.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut best: Option<(f64, usize)> = None;
    for run in sorted.chunk_by(|a, b| a == b) {
        if best.is_none_or(|(_, count)| run.len() > count) {
            best = Some((run[0], run.len()));
        }
    }
    best.map(|(value, _)| value)
}
