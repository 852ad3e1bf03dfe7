//! Maximum-likelihood logistic regression.

use crate::design::Design;
use crate::error::{FitError, Result};
use crate::fit::{Fit, Link, Reference};
use crate::linalg::{cross, factor, max_abs, weighted_gram};
use crate::model::Regression;

/// Probabilities this close to the observed 0/1 outcome count as perfect
/// prediction.
const SEPARATION_TOL: f64 = 1e-8;

#[inline]
pub(crate) fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn check_binary(y: &[f64]) -> Result<()> {
    if y.iter().any(|v| *v != 0.0 && *v != 1.0) {
        return Err(FitError::Dimension(
            "binary response must be coded 0/1".to_string(),
        ));
    }
    Ok(())
}

/// Logistic regression fitted by Newton-Raphson with Wald inference.
#[derive(Debug, Clone, Copy)]
pub struct Logistic {
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for Logistic {
    fn default() -> Self {
        Self {
            max_iter: 35,
            tol: 1e-8,
        }
    }
}

impl Regression for Logistic {
    fn name(&self) -> &'static str {
        "logistic"
    }

    fn fit(&self, design: &Design, y: &[f64]) -> Result<Fit> {
        design.check_response(y)?;
        check_binary(y)?;
        let p = design.n_params();
        let mut beta = vec![0.0; p];
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;
            let probs: Vec<f64> = design.predict(&beta).into_iter().map(sigmoid).collect();
            if separated(&probs, y) {
                return Err(FitError::PerfectSeparation);
            }
            let weights: Vec<f64> = probs.iter().map(|pi| pi * (1.0 - pi)).collect();
            let residuals: Vec<f64> = y.iter().zip(&probs).map(|(obs, pi)| obs - pi).collect();
            let chol = match factor(weighted_gram(design, &weights)) {
                Ok(chol) => chol,
                Err(FitError::Singular) if separated(&probs, y) => {
                    return Err(FitError::PerfectSeparation);
                }
                Err(error) => return Err(error),
            };
            let step = chol.solve(&cross(design, &residuals));
            for (b, d) in beta.iter_mut().zip(step.iter()) {
                *b += d;
            }
            if beta.iter().any(|b| !b.is_finite()) {
                return Err(FitError::Diverged { iterations });
            }
            if max_abs(step.iter().copied()) < self.tol {
                converged = true;
                break;
            }
        }

        let probs: Vec<f64> = design.predict(&beta).into_iter().map(sigmoid).collect();
        if separated(&probs, y) {
            return Err(FitError::PerfectSeparation);
        }
        let weights: Vec<f64> = probs.iter().map(|pi| pi * (1.0 - pi)).collect();
        let covariance = factor(weighted_gram(design, &weights))?.inverse();
        let variances: Vec<f64> = covariance.diagonal().iter().copied().collect();
        Fit::wald(
            beta,
            &variances,
            Reference::Normal,
            converged,
            iterations,
            Link::Logit,
        )
    }
}

fn separated(probs: &[f64], y: &[f64]) -> bool {
    probs
        .iter()
        .zip(y)
        .all(|(pi, obs)| (pi - obs).abs() < SEPARATION_TOL)
}
