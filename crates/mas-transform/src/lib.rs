//! Preprocessing for association studies.
//!
//! Transforms run in a fixed order over a [`Prepared`] dataset:
//!
//! 1. **sex**: sex-specific limiting
//! 2. **missing**: drop or fill nulls
//! 3. **constants**: prune constant columns
//! 4. **categorical**: drop-first indicator expansion
//! 5. **scaling**: optional continuous transform
//! 6. **outcomes**: dependent validation
//!
//! The role set stays disjoint and consistent with the frame after every step.

mod categorical;
mod constants;
pub mod data_utils;
mod error;
mod missing;
mod outcomes;
mod pipeline;
mod prepared;
mod scaling;
mod sex;

pub use categorical::expand_categoricals;
pub use constants::{constant_columns, drop_constant_columns};
pub use error::{Result, TransformError};
pub use missing::handle_missing;
pub use outcomes::validate_dependents;
pub use pipeline::PreprocessPipeline;
pub use prepared::Prepared;
pub use scaling::transform_continuous;
pub use sex::limit_sex_specific;
