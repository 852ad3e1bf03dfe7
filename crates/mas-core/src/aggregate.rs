//! Result table assembly.

use std::collections::HashMap;

use mas_model::{
    ColumnKind, MISSING_COUNT, MISSING_FLOAT, MISSING_TEXT, ModelKind, OutcomeCounts,
    ResultColumn, ResultRecord, column_by_name, result_columns,
};
use polars::prelude::{
    Column, DataFrame, DataType, PlSmallStr, PolarsResult, SortMultipleOptions,
};

/// Build a frame in the model's result schema from a batch of records.
pub fn records_to_frame(records: &[ResultRecord], model: ModelKind) -> PolarsResult<DataFrame> {
    let columns = result_columns(model)
        .iter()
        .map(|column| build_column(records, *column))
        .collect();
    DataFrame::new(columns)
}

fn build_column(records: &[ResultRecord], column: ResultColumn) -> Column {
    let name = PlSmallStr::from_static(column.name);
    match column.kind {
        ColumnKind::Text => {
            let values: Vec<&str> = records.iter().map(|r| text_field(r, column.name)).collect();
            Column::new(name, values)
        }
        ColumnKind::Float => {
            let values: Vec<f64> = records.iter().map(|r| float_field(r, column.name)).collect();
            Column::new(name, values)
        }
        ColumnKind::Count => {
            let values: Vec<i64> = records.iter().map(|r| count_field(r, column.name)).collect();
            Column::new(name, values)
        }
        ColumnKind::Flag => {
            let values: Vec<bool> = records.iter().map(|r| r.converged).collect();
            Column::new(name, values)
        }
    }
}

fn text_field<'a>(record: &'a ResultRecord, name: &str) -> &'a str {
    match name {
        "predictor" => &record.predictor,
        "dependent" => &record.dependent,
        "status" => record.status.as_str(),
        "failed_reason" => &record.failed_reason,
        "equation" => &record.equation,
        _ => MISSING_TEXT,
    }
}

fn float_field(record: &ResultRecord, name: &str) -> f64 {
    match name {
        "pval" => record.pval,
        "beta" => record.beta,
        "se" => record.se,
        "OR" => record.odds_ratio,
        "ci_low" => record.ci_low,
        "ci_high" => record.ci_high,
        _ => MISSING_FLOAT,
    }
}

fn count_field(record: &ResultRecord, name: &str) -> i64 {
    match name {
        "cases" => record.cases,
        "controls" => record.controls,
        "total_n" => record.total_n,
        "n_observations" => record.n_observations,
        _ => MISSING_COUNT,
    }
}

/// Column of `height` sentinel values for `dtype`.
fn sentinel_column(name: &PlSmallStr, dtype: &DataType, height: usize) -> Column {
    let kind = column_by_name(name.as_str()).map(|column| column.kind);
    match (kind, dtype) {
        (Some(ColumnKind::Text), _) | (None, DataType::String) => {
            Column::new(name.clone(), vec![MISSING_TEXT; height])
        }
        (Some(ColumnKind::Float), _) | (None, DataType::Float64) => {
            Column::new(name.clone(), vec![MISSING_FLOAT; height])
        }
        (Some(ColumnKind::Count), _) | (None, DataType::Int64) => {
            Column::new(name.clone(), vec![MISSING_COUNT; height])
        }
        (Some(ColumnKind::Flag), _) | (None, DataType::Boolean) => {
            Column::new(name.clone(), vec![false; height])
        }
        (None, dtype) => Column::full_null(name.clone(), height, dtype),
    }
}

/// Vertically concatenate frames whose columns may differ.
///
/// The output has the union of columns in first-seen order; a column absent
/// from a frame is filled with its sentinel.
pub fn concat_relaxed(frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    let mut order: Vec<PlSmallStr> = Vec::new();
    let mut dtypes: HashMap<PlSmallStr, DataType> = HashMap::new();
    for frame in &frames {
        for column in frame.get_columns() {
            if !dtypes.contains_key(column.name()) {
                order.push(column.name().clone());
                dtypes.insert(column.name().clone(), column.dtype().clone());
            }
        }
    }

    let mut combined: Option<DataFrame> = None;
    for frame in frames {
        let height = frame.height();
        let mut columns = Vec::with_capacity(order.len());
        for name in &order {
            match frame.column(name.as_str()) {
                Ok(column) => columns.push(column.clone()),
                Err(_) => columns.push(sentinel_column(name, &dtypes[name], height)),
            }
        }
        let aligned = DataFrame::new(columns)?;
        match combined.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => combined = Some(aligned),
        }
    }
    Ok(combined.unwrap_or_default())
}

/// Stable sort by ascending `pval`, NaN last. Idempotent.
pub fn sort_results(frame: &DataFrame) -> PolarsResult<DataFrame> {
    if frame.get_column_index("pval").is_none() || frame.height() < 2 {
        return Ok(frame.clone());
    }
    frame.sort(
        ["pval"],
        SortMultipleOptions::default()
            .with_maintain_order(true)
            .with_nulls_last(true),
    )
}

/// Tally statuses across records.
pub fn count_outcomes<'a>(records: impl IntoIterator<Item = &'a ResultRecord>) -> OutcomeCounts {
    records.into_iter().map(|record| record.status).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_model::{AnalysisTask, OutcomeStatus};
    use polars::prelude::*;

    fn record(dependent: &str, pval: f64) -> ResultRecord {
        let task = AnalysisTask {
            index: 0,
            predictor: "snp".into(),
            dependent: dependent.into(),
            covariates: Vec::new(),
        };
        let mut record = ResultRecord::empty(&task, OutcomeStatus::Completed);
        record.pval = pval;
        record
    }

    #[test]
    fn binary_schema_has_odds_ratio() {
        let frame = records_to_frame(&[record("d1", 0.5)], ModelKind::Firth).unwrap();
        assert!(frame.column("OR").is_ok());
        assert!(frame.column("n_observations").is_err());
        assert_eq!(frame.column("cases").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn relaxed_concat_fills_sentinels() {
        let binary = records_to_frame(&[record("d1", 0.1)], ModelKind::Logistic).unwrap();
        let linear = records_to_frame(&[record("d2", 0.2)], ModelKind::Linear).unwrap();
        let combined = concat_relaxed(vec![binary, linear]).unwrap();
        assert_eq!(combined.height(), 2);
        let n_obs = combined.column("n_observations").unwrap().i64().unwrap().clone();
        assert_eq!(n_obs.get(0), Some(MISSING_COUNT));
        let odds = combined.column("OR").unwrap().f64().unwrap().clone();
        assert!(odds.get(1).unwrap().is_nan());
    }

    #[test]
    fn sort_puts_nan_last_and_keeps_ties_in_order() {
        let records = [
            record("a", f64::NAN),
            record("b", 0.3),
            record("c", 0.01),
            record("d", 0.3),
        ];
        let frame = records_to_frame(&records, ModelKind::Firth).unwrap();
        let sorted = sort_results(&frame).unwrap();
        assert_eq!(dependents(&sorted), vec!["c", "b", "d", "a"]);
        let again = sort_results(&sorted).unwrap();
        assert_eq!(dependents(&again), dependents(&sorted));
    }

    fn dependents(frame: &DataFrame) -> Vec<String> {
        frame
            .column("dependent")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }
}
