//! The solver contract and the configured model.

use mas_model::ModelKind;

use crate::design::Design;
use crate::error::Result;
use crate::firth::FirthLogistic;
use crate::fit::Fit;
use crate::linear::LinearOls;
use crate::logistic::Logistic;

/// A regression solver.
///
/// `fit` receives the design (tested predictor in column 0, intercept last)
/// and the response. Implementations must be usable from many threads at once.
pub trait Regression: Send + Sync {
    fn name(&self) -> &'static str;

    fn fit(&self, design: &Design, y: &[f64]) -> Result<Fit>;
}

/// The solver selected for a run.
#[derive(Debug, Clone, Copy)]
pub enum Model {
    Firth(FirthLogistic),
    Logistic(Logistic),
    Linear(LinearOls),
}

impl Model {
    pub fn from_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Firth => Self::Firth(FirthLogistic::default()),
            ModelKind::Logistic => Self::Logistic(Logistic::default()),
            ModelKind::Linear => Self::Linear(LinearOls),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Firth(_) => ModelKind::Firth,
            Self::Logistic(_) => ModelKind::Logistic,
            Self::Linear(_) => ModelKind::Linear,
        }
    }
}

impl Regression for Model {
    fn name(&self) -> &'static str {
        match self {
            Self::Firth(model) => model.name(),
            Self::Logistic(model) => model.name(),
            Self::Linear(model) => model.name(),
        }
    }

    fn fit(&self, design: &Design, y: &[f64]) -> Result<Fit> {
        match self {
            Self::Firth(model) => model.fit(design, y),
            Self::Logistic(model) => model.fit(design, y),
            Self::Linear(model) => model.fit(design, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        for kind in [ModelKind::Firth, ModelKind::Logistic, ModelKind::Linear] {
            let model = Model::from_kind(kind);
            assert_eq!(model.kind(), kind);
            assert_eq!(model.name(), kind.as_str());
        }
    }
}
