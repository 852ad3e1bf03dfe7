use serde::{Deserialize, Serialize};

/// One (predictor, dependent, covariates) unit of analysis work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTask {
    /// Position in generation order (predictor-major, dependent-minor).
    pub index: usize,
    pub predictor: String,
    pub dependent: String,
    pub covariates: Vec<String>,
}

impl AnalysisTask {
    /// Columns to project for this task: predictor, dependent, covariates.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.covariates.len() + 2);
        columns.push(self.predictor.clone());
        columns.push(self.dependent.clone());
        columns.extend(self.covariates.iter().cloned());
        columns
    }
}

/// Model equation in `dependent ~ predictor + cov1 + ...` form.
pub fn model_equation(dependent: &str, predictor: &str, covariates: &[String]) -> String {
    let mut equation = format!("{dependent} ~ {predictor}");
    for covariate in covariates {
        equation.push_str(" + ");
        equation.push_str(covariate);
    }
    equation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equation_lists_covariates_in_order() {
        let covariates = vec!["age".to_string(), "sex".to_string()];
        assert_eq!(model_equation("y", "x", &covariates), "y ~ x + age + sex");
        assert_eq!(model_equation("y", "x", &[]), "y ~ x");
    }
}
