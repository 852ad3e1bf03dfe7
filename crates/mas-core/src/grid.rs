//! Task grid generation.

use mas_model::{AnalysisTask, ColumnRoleSet};

/// One task per (predictor, dependent) pair, predictor-major.
///
/// Every task carries the current covariate list; `index` is the generation
/// position.
pub fn build_task_grid(roles: &ColumnRoleSet) -> Vec<AnalysisTask> {
    let covariates = roles.covariates().to_vec();
    roles
        .predictors()
        .iter()
        .flat_map(|predictor| {
            roles
                .dependents()
                .iter()
                .map(move |dependent| (predictor, dependent))
        })
        .enumerate()
        .map(|(index, (predictor, dependent))| AnalysisTask {
            index,
            predictor: predictor.clone(),
            dependent: dependent.clone(),
            covariates: covariates.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictor_major_order() {
        let roles = ColumnRoleSet::new(
            vec!["p1".into(), "p2".into()],
            vec!["age".into()],
            vec!["d1".into(), "d2".into(), "d3".into()],
        )
        .unwrap();
        let grid = build_task_grid(&roles);
        let pairs: Vec<(usize, &str, &str)> = grid
            .iter()
            .map(|task| (task.index, task.predictor.as_str(), task.dependent.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (0, "p1", "d1"),
                (1, "p1", "d2"),
                (2, "p1", "d3"),
                (3, "p2", "d1"),
                (4, "p2", "d2"),
                (5, "p2", "d3"),
            ]
        );
        assert!(grid.iter().all(|task| task.covariates == ["age"]));
    }
}
