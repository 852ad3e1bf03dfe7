//! Ordinary least squares.

use crate::design::Design;
use crate::error::{FitError, Result};
use crate::fit::{Fit, Link, Reference};
use crate::linalg::{cross, factor, weighted_gram};
use crate::model::Regression;

/// OLS with t-distribution inference on `n - p` degrees of freedom.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearOls;

impl Regression for LinearOls {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(&self, design: &Design, y: &[f64]) -> Result<Fit> {
        design.check_response(y)?;
        let n = design.n_rows();
        let p = design.n_params();
        if n <= p {
            return Err(FitError::Dimension(format!(
                "{n} observations leave no residual degrees of freedom for {p} parameters"
            )));
        }
        let chol = factor(weighted_gram(design, &vec![1.0; n]))?;
        let beta = chol.solve(&cross(design, y));
        let coefficients: Vec<f64> = beta.iter().copied().collect();

        let fitted = design.predict(&coefficients);
        let ssr: f64 = y.iter().zip(&fitted).map(|(obs, fit)| (obs - fit).powi(2)).sum();
        let df = (n - p) as f64;
        let sigma2 = ssr / df;
        let variances: Vec<f64> = chol.inverse().diagonal().iter().map(|v| v * sigma2).collect();

        Fit::wald(
            coefficients,
            &variances,
            Reference::StudentsT { df },
            true,
            1,
            Link::Identity,
        )
    }
}
