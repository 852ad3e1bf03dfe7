//! Dense design matrices.

use crate::error::{FitError, Result};

/// Row-major design matrix.
///
/// Columns keep the order they were given in; the intercept, when requested,
/// is the last column. Coefficient 0 is therefore the tested predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    n: usize,
    p: usize,
    data: Vec<f64>,
}

impl Design {
    /// Build from column vectors, appending an intercept column when asked.
    pub fn from_columns(columns: &[Vec<f64>], intercept: bool) -> Result<Self> {
        let n = columns.first().map_or(0, Vec::len);
        let p = columns.len() + usize::from(intercept);
        if n == 0 || p == 0 {
            return Err(FitError::Dimension(
                "design must have at least one row and one column".to_string(),
            ));
        }
        for (j, column) in columns.iter().enumerate() {
            if column.len() != n {
                return Err(FitError::Dimension(format!(
                    "column {j} has {} rows, expected {n}",
                    column.len()
                )));
            }
            if column.iter().any(|v| !v.is_finite()) {
                return Err(FitError::NonFinite(format!("design column {j}")));
            }
        }
        let mut data = Vec::with_capacity(n * p);
        for i in 0..n {
            data.extend(columns.iter().map(|column| column[i]));
            if intercept {
                data.push(1.0);
            }
        }
        Ok(Self { n, p, data })
    }

    pub fn n_rows(&self) -> usize {
        self.n
    }

    pub fn n_params(&self) -> usize {
        self.p
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.p;
        &self.data[start..start + self.p]
    }

    /// Linear predictor `X beta` for every row.
    pub fn predict(&self, beta: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|i| self.row(i).iter().zip(beta).map(|(x, b)| x * b).sum())
            .collect()
    }

    /// Check a response vector against this design.
    pub(crate) fn check_response(&self, y: &[f64]) -> Result<()> {
        if y.len() != self.n {
            return Err(FitError::Dimension(format!(
                "response has {} rows, design has {}",
                y.len(),
                self.n
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite("response".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intercept_is_last_column() {
        let design = Design::from_columns(&[vec![1.0, 2.0], vec![3.0, 4.0]], true).unwrap();
        assert_eq!(design.n_params(), 3);
        assert_eq!(design.row(1), &[2.0, 4.0, 1.0]);
    }

    #[test]
    fn nan_is_rejected() {
        let err = Design::from_columns(&[vec![1.0, f64::NAN]], true).unwrap_err();
        assert!(matches!(err, FitError::NonFinite(_)));
    }

    #[test]
    fn ragged_columns_rejected() {
        let err = Design::from_columns(&[vec![1.0, 2.0], vec![1.0]], false).unwrap_err();
        assert!(matches!(err, FitError::Dimension(_)));
    }
}
