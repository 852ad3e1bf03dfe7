use mas_model::{
    AnalysisConfig, AnalysisTask, ColumnRoleSet, FitSummary, MISSING_COUNT, MISSING_TEXT,
    ModelKind, OutcomeCounts, OutcomeStatus, ResultRecord, SampleCounts, SkipReason, TaskOutcome,
    result_columns,
};
use proptest::prelude::*;

fn task() -> AnalysisTask {
    AnalysisTask {
        index: 0,
        predictor: "snp".to_string(),
        dependent: "250.2".to_string(),
        covariates: vec!["age".to_string()],
    }
}

#[test]
fn skipped_record_uses_sentinels_for_statistics() {
    let outcome = TaskOutcome::Skipped {
        reason: SkipReason::InsufficientCases(5),
        counts: Some(SampleCounts::Binary {
            cases: 5,
            controls: 95,
            total: 100,
        }),
    };
    let record = ResultRecord::from_outcome(&task(), &outcome);
    assert_eq!(record.status, OutcomeStatus::Skipped);
    assert_eq!(record.failed_reason, "Insufficient case count (5 cases).");
    assert!(record.pval.is_nan());
    assert!(record.odds_ratio.is_nan());
    assert_eq!(record.cases, 5);
    assert_eq!(record.n_observations, MISSING_COUNT);
    assert_eq!(record.equation, MISSING_TEXT);
    assert!(record.is_consistent());
}

#[test]
fn completed_record_has_no_failure_reason() {
    let outcome = TaskOutcome::Completed {
        fit: FitSummary {
            pval: 0.01,
            beta: 0.5,
            se: 0.2,
            ci_low: 0.1,
            ci_high: 0.9,
            odds_ratio: Some(0.5f64.exp()),
            converged: true,
        },
        counts: SampleCounts::Binary {
            cases: 40,
            controls: 60,
            total: 100,
        },
        equation: "250.2 ~ snp + age".to_string(),
    };
    let record = ResultRecord::from_outcome(&task(), &outcome);
    assert_eq!(record.failed_reason, MISSING_TEXT);
    assert!(record.converged);
    assert!(record.is_consistent());
}

#[test]
fn failed_record_keeps_equation_and_message() {
    let outcome = TaskOutcome::Failed {
        reason: "singular matrix".to_string(),
        counts: None,
        equation: "250.2 ~ snp + age".to_string(),
    };
    let record = ResultRecord::from_outcome(&task(), &outcome);
    assert_eq!(record.status, OutcomeStatus::Failed);
    assert_eq!(record.failed_reason, "singular matrix");
    assert_eq!(record.equation, "250.2 ~ snp + age");
    assert!(record.beta.is_nan());
    assert_eq!(record.cases, MISSING_COUNT);
    assert!(record.is_consistent());
}

#[test]
fn outcome_counts_tally_statuses() {
    let counts: OutcomeCounts = [
        OutcomeStatus::Completed,
        OutcomeStatus::Skipped,
        OutcomeStatus::Completed,
        OutcomeStatus::Failed,
    ]
    .into_iter()
    .collect();
    assert_eq!(counts.completed, 2);
    assert_eq!(counts.total(), 4);
}

#[test]
fn linear_schema_has_no_odds_ratio() {
    let names: Vec<&str> = result_columns(ModelKind::Linear)
        .iter()
        .map(|column| column.name)
        .collect();
    assert!(!names.contains(&"OR"));
    assert!(names.contains(&"n_observations"));
    let binary: Vec<&str> = result_columns(ModelKind::Firth)
        .iter()
        .map(|column| column.name)
        .collect();
    assert!(binary.contains(&"OR"));
}

#[test]
fn config_serializes() {
    let config = AnalysisConfig::default().with_model(ModelKind::Logistic);
    let json = serde_json::to_string(&config).expect("serialize config");
    let round: AnalysisConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(round, config);
}

fn column_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z]{1,3}", 3..12)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn role_edits_preserve_disjointness(
        names in column_names(),
        split in 1usize..3,
        drop_index in 0usize..12,
    ) {
        let predictors = names[..1].to_vec();
        let covariates = names[1..=split].to_vec();
        let dependents = names[split + 1..].to_vec();
        let roles = ColumnRoleSet::new(predictors, covariates.clone(), dependents).unwrap();

        let dropped = roles.without(&names[drop_index % names.len()]);
        prop_assert!(dropped.validate_disjoint().is_ok());

        let target = &covariates[0];
        let replacements = vec![format!("{target}_x"), format!("{target}_y")];
        if let Ok(replaced) = roles.replace(target, &replacements) {
            prop_assert!(replaced.validate_disjoint().is_ok());
            prop_assert!(!replaced.contains(target));
            prop_assert_eq!(
                replaced.covariates().len(),
                roles.covariates().len() + 1
            );
        }
    }
}
