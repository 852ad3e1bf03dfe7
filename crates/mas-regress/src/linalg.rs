//! Row-parallel accumulation of normal-equation terms.
//!
//! Rows are split into fixed-size chunks that run on the current rayon pool.
//! Partial sums are combined in chunk order so results do not depend on the
//! number of threads.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use rayon::prelude::*;

use crate::design::Design;
use crate::error::{FitError, Result};

const CHUNK_ROWS: usize = 2048;

/// Smallest accepted ratio between a squared Cholesky pivot and its diagonal
/// entry, i.e. the share of a column not explained by the columns before it.
const MIN_PIVOT_RATIO: f64 = 1e-10;

fn chunks(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .step_by(CHUNK_ROWS)
        .map(|start| (start, (start + CHUNK_ROWS).min(n)))
        .collect()
}

fn sum_in_order(partials: Vec<Vec<f64>>, len: usize) -> Vec<f64> {
    partials.into_iter().fold(vec![0.0; len], |mut acc, part| {
        for (total, value) in acc.iter_mut().zip(part) {
            *total += value;
        }
        acc
    })
}

/// `X^T diag(w) X`.
pub(crate) fn weighted_gram(design: &Design, weights: &[f64]) -> DMatrix<f64> {
    let p = design.n_params();
    let partials: Vec<Vec<f64>> = chunks(design.n_rows())
        .par_iter()
        .map(|&(start, end)| {
            let mut acc = vec![0.0; p * p];
            for i in start..end {
                let row = design.row(i);
                let w = weights[i];
                for a in 0..p {
                    let wa = w * row[a];
                    for b in a..p {
                        acc[a * p + b] += wa * row[b];
                    }
                }
            }
            acc
        })
        .collect();
    let upper = sum_in_order(partials, p * p);
    DMatrix::from_fn(p, p, |a, b| {
        if a <= b {
            upper[a * p + b]
        } else {
            upper[b * p + a]
        }
    })
}

/// `X^T v`.
pub(crate) fn cross(design: &Design, v: &[f64]) -> DVector<f64> {
    let p = design.n_params();
    let partials: Vec<Vec<f64>> = chunks(design.n_rows())
        .par_iter()
        .map(|&(start, end)| {
            let mut acc = vec![0.0; p];
            for i in start..end {
                for (total, x) in acc.iter_mut().zip(design.row(i)) {
                    *total += x * v[i];
                }
            }
            acc
        })
        .collect();
    DVector::from_vec(sum_in_order(partials, p))
}

/// `w_i * x_i^T M x_i` for every row (the hat diagonal when `M` is the
/// inverse information).
pub(crate) fn leverages(design: &Design, matrix: &DMatrix<f64>, weights: &[f64]) -> Vec<f64> {
    let p = design.n_params();
    let parts: Vec<Vec<f64>> = chunks(design.n_rows())
        .par_iter()
        .map(|&(start, end)| {
            (start..end)
                .map(|i| {
                    let row = design.row(i);
                    let mut quad = 0.0;
                    for a in 0..p {
                        let mut inner = 0.0;
                        for b in 0..p {
                            inner += matrix[(a, b)] * row[b];
                        }
                        quad += row[a] * inner;
                    }
                    weights[i] * quad
                })
                .collect()
        })
        .collect();
    parts.into_iter().flatten().collect()
}

/// Cholesky factor of a symmetric positive definite matrix.
///
/// Numerically rank-deficient matrices are reported as singular. Each pivot
/// is compared with its own diagonal entry, so the check does not depend on
/// the units of the columns.
pub(crate) fn factor(matrix: DMatrix<f64>) -> Result<Cholesky<f64, Dyn>> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("information matrix".to_string()));
    }
    let diagonal = matrix.diagonal();
    let chol = matrix.cholesky().ok_or(FitError::Singular)?;
    let rank_deficient = chol
        .l_dirty()
        .diagonal()
        .iter()
        .zip(diagonal.iter())
        .any(|(pivot, entry)| *entry <= 0.0 || pivot * pivot / entry < MIN_PIVOT_RATIO);
    if rank_deficient {
        return Err(FitError::Singular);
    }
    Ok(chol)
}

/// `ln det` from a Cholesky factor.
pub(crate) fn log_det(chol: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

pub(crate) fn max_abs(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gram_matches_direct_product() {
        let design = Design::from_columns(&[vec![1.0, 2.0, 3.0]], true).unwrap();
        let gram = weighted_gram(&design, &[1.0, 1.0, 1.0]);
        assert_eq!(gram[(0, 0)], 14.0);
        assert_eq!(gram[(0, 1)], 6.0);
        assert_eq!(gram[(1, 0)], 6.0);
        assert_eq!(gram[(1, 1)], 3.0);
    }

    #[test]
    fn collinear_columns_are_singular() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let twice: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let design = Design::from_columns(&[x, twice], true).unwrap();
        let gram = weighted_gram(&design, &[1.0; 4]);
        assert!(matches!(factor(gram), Err(FitError::Singular)));
    }

    #[test]
    fn column_units_do_not_affect_the_rank_check() {
        let x = vec![0.0, 1.0, 2.0, 1.0, 0.0, 2.0];
        let cents: Vec<f64> = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0]
            .iter()
            .map(|v| v * 2e6)
            .collect();
        let design = Design::from_columns(&[x, cents], true).unwrap();
        let gram = weighted_gram(&design, &[1.0; 6]);
        assert!(factor(gram).is_ok());
    }
}
