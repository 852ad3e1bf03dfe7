//! Regression solvers used by the association executor.
//!
//! Every solver implements [`Regression`]: given a [`Design`] whose first
//! column is the tested predictor and whose last column is the intercept, it
//! returns a [`Fit`] or a [`FitError`].
//!
//! - **firth**: Jeffreys-penalized logistic regression
//! - **logistic**: maximum-likelihood logistic regression
//! - **linear**: ordinary least squares
//!
//! Normal-equation terms are accumulated with rayon on whichever pool the
//! caller installs.

mod design;
mod error;
mod firth;
mod fit;
mod linalg;
mod linear;
mod logistic;
mod model;

pub use design::Design;
pub use error::{FitError, Result};
pub use firth::FirthLogistic;
pub use fit::{Fit, Link};
pub use linear::LinearOls;
pub use logistic::Logistic;
pub use model::{Model, Regression};
