//! DataFrame value helpers shared by the transforms.

use polars::prelude::{DataFrame, DataType, NamedFrom, PolarsResult, Series};

/// Check whether the frame has a column with this exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Read a column as nullable floats.
///
/// Values that cannot be represented as a float (text) come back as `None`.
pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Replace (or add) a float column.
pub fn set_float_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Number of distinct non-null values in a column.
pub fn distinct_non_null(df: &DataFrame, name: &str) -> PolarsResult<usize> {
    df.column(name)?
        .as_materialized_series()
        .drop_nulls()
        .n_unique()
}

/// Remove the listed columns from the frame.
pub fn drop_columns(df: &DataFrame, names: &[String]) -> PolarsResult<DataFrame> {
    names
        .iter()
        .try_fold(df.clone(), |frame, name| frame.drop(name))
}

/// Whether values of this dtype are plain numbers.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Render a numeric level for use in a column name.
///
/// Integral values print without a fractional part (`2.0` becomes `2`).
pub fn format_level(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
