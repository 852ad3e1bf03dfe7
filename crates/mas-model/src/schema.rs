//! Column layout of the result table.

use crate::options::ModelKind;

/// Storage kind of a result column, which also fixes its sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Float,
    Count,
    Flag,
}

/// A named result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn column(name: &'static str, kind: ColumnKind) -> ResultColumn {
    ResultColumn { name, kind }
}

pub const PREDICTOR: ResultColumn = column("predictor", ColumnKind::Text);
pub const DEPENDENT: ResultColumn = column("dependent", ColumnKind::Text);
pub const STATUS: ResultColumn = column("status", ColumnKind::Text);
pub const PVAL: ResultColumn = column("pval", ColumnKind::Float);
pub const BETA: ResultColumn = column("beta", ColumnKind::Float);
pub const SE: ResultColumn = column("se", ColumnKind::Float);
pub const ODDS_RATIO: ResultColumn = column("OR", ColumnKind::Float);
pub const CI_LOW: ResultColumn = column("ci_low", ColumnKind::Float);
pub const CI_HIGH: ResultColumn = column("ci_high", ColumnKind::Float);
pub const CASES: ResultColumn = column("cases", ColumnKind::Count);
pub const CONTROLS: ResultColumn = column("controls", ColumnKind::Count);
pub const TOTAL_N: ResultColumn = column("total_n", ColumnKind::Count);
pub const N_OBSERVATIONS: ResultColumn = column("n_observations", ColumnKind::Count);
pub const CONVERGED: ResultColumn = column("converged", ColumnKind::Flag);
pub const FAILED_REASON: ResultColumn = column("failed_reason", ColumnKind::Text);
pub const EQUATION: ResultColumn = column("equation", ColumnKind::Text);

const BINARY_COLUMNS: &[ResultColumn] = &[
    PREDICTOR,
    DEPENDENT,
    STATUS,
    PVAL,
    BETA,
    SE,
    ODDS_RATIO,
    CI_LOW,
    CI_HIGH,
    CASES,
    CONTROLS,
    TOTAL_N,
    CONVERGED,
    FAILED_REASON,
    EQUATION,
];

const LINEAR_COLUMNS: &[ResultColumn] = &[
    PREDICTOR,
    DEPENDENT,
    STATUS,
    PVAL,
    BETA,
    SE,
    CI_LOW,
    CI_HIGH,
    N_OBSERVATIONS,
    CONVERGED,
    FAILED_REASON,
    EQUATION,
];

/// Result columns emitted for a model, in output order.
pub fn result_columns(model: ModelKind) -> &'static [ResultColumn] {
    if model.is_binary() {
        BINARY_COLUMNS
    } else {
        LINEAR_COLUMNS
    }
}

/// Look up a known result column by name.
pub fn column_by_name(name: &str) -> Option<ResultColumn> {
    BINARY_COLUMNS
        .iter()
        .chain(LINEAR_COLUMNS)
        .find(|column| column.name == name)
        .copied()
}
