//! Rescaling of continuous independents.

use mas_model::ContinuousTransform;
use tracing::{info, warn};

use crate::data_utils::{float_values, set_float_column};
use crate::error::Result;
use crate::prepared::Prepared;

/// Rescale every non-categorical predictor and covariate.
///
/// Statistics ignore nulls; `standard` uses the sample standard deviation.
pub fn transform_continuous(mut prepared: Prepared, transform: ContinuousTransform) -> Result<Prepared> {
    let columns: Vec<String> = prepared
        .roles
        .independents()
        .into_iter()
        .filter(|column| !prepared.is_categorical(column))
        .collect();
    for column in &columns {
        let values = float_values(&prepared.frame, column)?;
        let Some((center, scale)) = parameters(&values, transform) else {
            warn!(column = %column, "column has no spread, skipping transform");
            continue;
        };
        let scaled = values
            .into_iter()
            .map(|value| value.map(|x| (x - center) / scale))
            .collect();
        set_float_column(&mut prepared.frame, column, scaled)?;
    }
    info!(?transform, columns = columns.len(), "transformed continuous columns");
    Ok(prepared)
}

/// `(center, scale)` for the transform, or `None` when the scale is zero.
fn parameters(values: &[Option<f64>], transform: ContinuousTransform) -> Option<(f64, f64)> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    let (center, scale) = match transform {
        ContinuousTransform::Standard => {
            if observed.len() < 2 {
                return None;
            }
            let n = observed.len() as f64;
            let mean = observed.iter().sum::<f64>() / n;
            let variance = observed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            (mean, variance.sqrt())
        }
        ContinuousTransform::MinMax => {
            let min = observed.iter().copied().reduce(f64::min)?;
            let max = observed.iter().copied().reduce(f64::max)?;
            (min, max - min)
        }
    };
    (scale.is_finite() && scale > 0.0).then_some((center, scale))
}
