//! Fitted-model results.

use mas_model::FitSummary;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::error::{FitError, Result};

/// Link between the linear predictor and the outcome mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Logit,
}

/// Reference distribution of the coefficient test statistic.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reference {
    Normal,
    StudentsT { df: f64 },
}

impl Reference {
    /// Two-sided p-value and 95% critical value.
    fn p_and_critical(self, statistic: f64) -> Result<(f64, f64)> {
        match self {
            Self::Normal => {
                let normal = Normal::standard();
                Ok((2.0 * normal.sf(statistic.abs()), normal.inverse_cdf(0.975)))
            }
            Self::StudentsT { df } => {
                let dist = StudentsT::new(0.0, 1.0, df)
                    .map_err(|error| FitError::Dimension(error.to_string()))?;
                Ok((2.0 * dist.sf(statistic.abs()), dist.inverse_cdf(0.975)))
            }
        }
    }
}

/// Coefficient-level inference for every design column.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub pvalues: Vec<f64>,
    pub conf_int: Vec<(f64, f64)>,
    pub converged: bool,
    pub iterations: usize,
    pub link: Link,
}

impl Fit {
    /// Wald inference from estimates and their covariance diagonal.
    pub(crate) fn wald(
        coefficients: Vec<f64>,
        variances: &[f64],
        reference: Reference,
        converged: bool,
        iterations: usize,
        link: Link,
    ) -> Result<Self> {
        let mut std_errors = Vec::with_capacity(coefficients.len());
        let mut pvalues = Vec::with_capacity(coefficients.len());
        let mut conf_int = Vec::with_capacity(coefficients.len());
        for (beta, variance) in coefficients.iter().zip(variances) {
            let se = variance.sqrt();
            if !beta.is_finite() || !se.is_finite() {
                return Err(FitError::NonFinite("coefficient estimates".to_string()));
            }
            let (pval, critical) = reference.p_and_critical(beta / se)?;
            std_errors.push(se);
            pvalues.push(pval);
            conf_int.push((beta - critical * se, beta + critical * se));
        }
        Ok(Self {
            coefficients,
            std_errors,
            pvalues,
            conf_int,
            converged,
            iterations,
            link,
        })
    }

    /// Statistics of the tested predictor (design column 0).
    pub fn summary(&self) -> FitSummary {
        let beta = self.coefficients.first().copied().unwrap_or(f64::NAN);
        let (ci_low, ci_high) = self.conf_int.first().copied().unwrap_or((f64::NAN, f64::NAN));
        FitSummary {
            pval: self.pvalues.first().copied().unwrap_or(f64::NAN),
            beta,
            se: self.std_errors.first().copied().unwrap_or(f64::NAN),
            ci_low,
            ci_high,
            odds_ratio: (self.link == Link::Logit).then(|| beta.exp()),
            converged: self.converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_reference_matches_textbook_values() {
        let fit = Fit::wald(vec![1.0], &[0.25], Reference::Normal, true, 3, Link::Logit).unwrap();
        // z = 2
        assert!((fit.pvalues[0] - 0.0455).abs() < 1e-4);
        assert!((fit.conf_int[0].0 - (1.0 - 1.959964 * 0.5)).abs() < 1e-5);
        let summary = fit.summary();
        assert_eq!(summary.odds_ratio, Some(1.0_f64.exp()));
    }

    #[test]
    fn identity_link_has_no_odds_ratio() {
        let fit = Fit::wald(
            vec![0.5],
            &[0.01],
            Reference::StudentsT { df: 10.0 },
            true,
            1,
            Link::Identity,
        )
        .unwrap();
        assert_eq!(fit.summary().odds_ratio, None);
        assert!(fit.pvalues[0] < 0.01);
    }

    #[test]
    fn nan_variance_is_an_error() {
        let err = Fit::wald(vec![1.0], &[f64::NAN], Reference::Normal, true, 1, Link::Logit);
        assert!(matches!(err, Err(FitError::NonFinite(_))));
    }
}
