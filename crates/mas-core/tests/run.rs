use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mas_core::{CancellationFlag, RunError, run_analysis, run_analysis_with};
use mas_model::{
    AnalysisConfig, ColumnRoleSet, ExecutionMode, ExecutionOptions, ModelKind,
};
use mas_regress::{Design, Fit, FitError, Model, Regression};
use mas_transform::{PreprocessPipeline, Prepared};
use polars::prelude::*;

/// Deterministic uniform draws in `[0, 1)`.
fn draws(seed: u64, n: usize) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

fn binary_outcome(seed: u64, linear: &[f64]) -> Vec<f64> {
    draws(seed, linear.len())
        .into_iter()
        .zip(linear)
        .map(|(u, eta)| {
            let p = 1.0 / (1.0 + (-eta).exp());
            if u < p { 1.0 } else { 0.0 }
        })
        .collect()
}

/// 400 rows, two predictors, three binary outcomes, age covariate.
fn cohort() -> (DataFrame, ColumnRoleSet) {
    let n = 400;
    let p1: Vec<f64> = (0..n).map(|i| (i % 3) as f64).collect();
    let p2: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64 / 2.0).collect();
    let age: Vec<f64> = draws(99, n).iter().map(|u| 30.0 + 40.0 * u).collect();
    let d1 = binary_outcome(1, &p1.iter().map(|x| -1.0 + 0.9 * x).collect::<Vec<_>>());
    let d2 = binary_outcome(2, &p2.iter().map(|x| -0.5 + 0.2 * x).collect::<Vec<_>>());
    let d3 = binary_outcome(3, &age.iter().map(|a| -2.0 + 0.03 * a).collect::<Vec<_>>());
    let frame = df! {
        "p1" => p1,
        "p2" => p2,
        "age" => age,
        "d1" => d1,
        "d2" => d2,
        "d3" => d3,
    }
    .unwrap();
    let roles = ColumnRoleSet::new(
        vec!["p1".into(), "p2".into()],
        vec!["age".into()],
        vec!["d1".into(), "d2".into(), "d3".into()],
    )
    .unwrap();
    (frame, roles)
}

fn text_column(frame: &DataFrame, name: &str) -> Vec<String> {
    frame
        .column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

fn float_column(frame: &DataFrame, name: &str) -> Vec<f64> {
    frame
        .column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}

#[test]
fn too_few_cases_gives_one_skipped_row() {
    let n = 100;
    let snp: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
    let y: Vec<f64> = (0..n).map(|i| if i < 5 { 1.0 } else { 0.0 }).collect();
    let frame = df! { "snp" => snp, "y" => y }.unwrap();
    let roles = ColumnRoleSet::new(vec!["snp".into()], Vec::new(), vec!["y".into()]).unwrap();
    let config = AnalysisConfig::default().with_min_cases(20);

    let output = run_analysis(&frame, &roles, &config, &CancellationFlag::new()).unwrap();
    assert_eq!(output.results.height(), 1);
    assert_eq!(output.counts.skipped, 1);
    assert_eq!(
        text_column(&output.results, "failed_reason"),
        vec!["Insufficient case count (5 cases)."]
    );
    assert_eq!(text_column(&output.results, "status"), vec!["skipped"]);
    assert!(float_column(&output.results, "pval")[0].is_nan());
    let cases = output.results.column("cases").unwrap().i64().unwrap().get(0);
    assert_eq!(cases, Some(5));
}

#[test]
fn globally_constant_covariate_is_absent_from_equations() {
    let (mut frame, _) = cohort();
    frame
        .with_column(Series::new("site".into(), vec![3.0; frame.height()]))
        .unwrap();
    let roles = ColumnRoleSet::new(
        vec!["p1".into()],
        vec!["site".into(), "age".into()],
        vec!["d1".into()],
    )
    .unwrap();
    let config = AnalysisConfig::default();
    let prepared = PreprocessPipeline::new(&config)
        .run(Prepared::new(frame, roles, Vec::new()).unwrap())
        .unwrap();
    assert_eq!(prepared.roles.covariates(), ["age"]);

    let output =
        run_analysis(&prepared.frame, &prepared.roles, &config, &CancellationFlag::new()).unwrap();
    let equations = text_column(&output.results, "equation");
    insta::assert_snapshot!(equations.join("\n"), @"d1 ~ p1 + age");
}

#[test]
fn full_grid_is_sorted_with_distinct_equations() {
    let (frame, roles) = cohort();
    let config = AnalysisConfig::default().with_model(ModelKind::Firth);
    let output = run_analysis(&frame, &roles, &config, &CancellationFlag::new()).unwrap();

    assert_eq!(output.n_tasks, 6);
    assert_eq!(output.results.height(), 6);
    assert_eq!(output.counts.completed, 6);
    let pvals = float_column(&output.results, "pval");
    assert!(pvals.iter().all(|p| p.is_finite()));
    assert!(pvals.windows(2).all(|pair| pair[0] <= pair[1]));
    let mut equations = text_column(&output.results, "equation");
    assert!(equations.iter().all(|eq| eq != "nan"));
    equations.sort();
    equations.dedup();
    assert_eq!(equations.len(), 6);
}

/// Fails every task whose outcome has a given number of rows.
struct FailOnRows {
    rows: usize,
    inner: Model,
}

impl Regression for FailOnRows {
    fn name(&self) -> &'static str {
        "firth"
    }

    fn fit(&self, design: &Design, y: &[f64]) -> mas_regress::Result<Fit> {
        if y.len() == self.rows {
            return Err(FitError::Diverged { iterations: 3 });
        }
        self.inner.fit(design, y)
    }
}

#[test]
fn solver_failure_is_recorded_and_run_completes() {
    let (mut frame, roles) = cohort();
    let d2: Vec<Option<f64>> = float_column(&frame, "d2")
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i >= 10).then_some(v))
        .collect();
    frame.with_column(Series::new("d2".into(), d2)).unwrap();
    let config = AnalysisConfig::default();
    let solver = Arc::new(FailOnRows {
        rows: 390,
        inner: Model::from_kind(ModelKind::Firth),
    });

    let output = run_analysis_with(&frame, &roles, &config, &CancellationFlag::new(), solver)
        .unwrap();
    assert_eq!(output.results.height(), 6);
    assert_eq!(output.counts.failed, 2);
    assert_eq!(output.counts.completed, 4);

    let statuses = text_column(&output.results, "status");
    let reasons = text_column(&output.results, "failed_reason");
    let dependents = text_column(&output.results, "dependent");
    let betas = float_column(&output.results, "beta");
    for row in 0..6 {
        if dependents[row] == "d2" {
            assert_eq!(statuses[row], "failed");
            assert_eq!(reasons[row], "estimates diverged after 3 iterations");
            assert!(betas[row].is_nan());
        } else {
            assert_eq!(statuses[row], "completed");
            assert_eq!(reasons[row], "nan");
        }
    }
    // failed rows carry NaN p-values and sort last
    assert_eq!(statuses[4..], ["failed", "failed"]);
}

#[test]
fn lazy_and_snapshot_schedules_agree() {
    let (frame, roles) = cohort();
    let run = |mode| {
        let config = AnalysisConfig::default()
            .with_model(ModelKind::Logistic)
            .with_execution(ExecutionOptions {
                mode,
                workers: 2,
                threads_per_worker: 2,
            });
        run_analysis(&frame, &roles, &config, &CancellationFlag::new()).unwrap()
    };
    let lazy = run(ExecutionMode::Lazy);
    let snapshot = run(ExecutionMode::Snapshot);
    for column in ["pval", "beta", "se", "ci_low", "ci_high", "OR"] {
        assert_eq!(
            float_column(&lazy.results, column),
            float_column(&snapshot.results, column),
            "{column}"
        );
    }
    assert_eq!(
        text_column(&lazy.results, "equation"),
        text_column(&snapshot.results, "equation")
    );
}

#[test]
fn linear_model_reports_observation_counts() {
    let (frame, _) = cohort();
    let roles =
        ColumnRoleSet::new(vec!["p1".into()], Vec::new(), vec!["age".into()]).unwrap();
    let config = AnalysisConfig::default().with_model(ModelKind::Linear);
    let output = run_analysis(&frame, &roles, &config, &CancellationFlag::new()).unwrap();
    assert!(output.results.column("OR").is_err());
    let n = output.results.column("n_observations").unwrap().i64().unwrap().get(0);
    assert_eq!(n, Some(400));
    assert_eq!(text_column(&output.results, "equation"), vec!["age ~ p1"]);
}

#[test]
fn cancelled_run_is_interrupted_in_both_modes() {
    let (frame, roles) = cohort();
    let cancel = CancellationFlag::new();
    cancel.cancel();
    for mode in [ExecutionMode::Lazy, ExecutionMode::Snapshot] {
        let config = AnalysisConfig::default().with_execution(ExecutionOptions {
            mode,
            ..ExecutionOptions::default()
        });
        let err = run_analysis(&frame, &roles, &config, &cancel).unwrap_err();
        assert!(matches!(err, RunError::Interrupted));
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Fit,
    Fail,
    Cancel,
}

/// Records the snapshot directories that are live while tasks are fitted.
struct SnapshotWatcher {
    cancel: CancellationFlag,
    behaviour: Behaviour,
    seen: Mutex<Vec<PathBuf>>,
    inner: Model,
}

impl SnapshotWatcher {
    fn new(cancel: &CancellationFlag, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            cancel: cancel.clone(),
            behaviour,
            seen: Mutex::new(Vec::new()),
            inner: Model::from_kind(ModelKind::Firth),
        })
    }

    fn seen(&self) -> Vec<PathBuf> {
        let mut seen = self.seen.lock().unwrap().clone();
        seen.sort();
        seen.dedup();
        seen
    }
}

impl Regression for SnapshotWatcher {
    fn name(&self) -> &'static str {
        "firth"
    }

    fn fit(&self, design: &Design, y: &[f64]) -> mas_regress::Result<Fit> {
        self.seen
            .lock()
            .unwrap()
            .extend(self.cancel.live_snapshots().paths());
        match self.behaviour {
            Behaviour::Fit => self.inner.fit(design, y),
            Behaviour::Fail => Err(FitError::Diverged { iterations: 1 }),
            Behaviour::Cancel => {
                self.cancel.cancel();
                self.inner.fit(design, y)
            }
        }
    }
}

fn snapshot_config() -> AnalysisConfig {
    AnalysisConfig::default().with_execution(ExecutionOptions {
        mode: ExecutionMode::Snapshot,
        workers: 1,
        threads_per_worker: 1,
    })
}

fn assert_snapshot_removed(cancel: &CancellationFlag, seen: &[PathBuf]) {
    assert_eq!(seen.len(), 1);
    assert!(seen[0].file_name().unwrap().to_string_lossy().starts_with("polars-mas-"));
    assert!(!seen[0].exists());
    assert!(cancel.live_snapshots().paths().is_empty());
}

#[test]
fn snapshot_is_removed_after_a_successful_run() {
    let (frame, roles) = cohort();
    let cancel = CancellationFlag::new();
    let solver = SnapshotWatcher::new(&cancel, Behaviour::Fit);
    let output =
        run_analysis_with(&frame, &roles, &snapshot_config(), &cancel, solver.clone()).unwrap();
    assert_eq!(output.counts.completed, 6);
    assert_snapshot_removed(&cancel, &solver.seen());
}

#[test]
fn snapshot_is_removed_after_an_interrupted_run() {
    let (frame, roles) = cohort();
    let cancel = CancellationFlag::new();
    let solver = SnapshotWatcher::new(&cancel, Behaviour::Cancel);
    let err =
        run_analysis_with(&frame, &roles, &snapshot_config(), &cancel, solver.clone()).unwrap_err();
    assert!(matches!(err, RunError::Interrupted));
    assert_snapshot_removed(&cancel, &solver.seen());
}

#[test]
fn snapshot_is_removed_when_every_fit_fails() {
    let (frame, roles) = cohort();
    let cancel = CancellationFlag::new();
    let solver = SnapshotWatcher::new(&cancel, Behaviour::Fail);
    let output =
        run_analysis_with(&frame, &roles, &snapshot_config(), &cancel, solver.clone()).unwrap();
    assert_eq!(output.counts.failed, 6);
    assert_snapshot_removed(&cancel, &solver.seen());
}
