use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use defaulter_data::clock::FixedClock;
use defaulter_data::testdata::synthetic_clinic_table;
use defaulter_data::{DerivedTable, Encoding, FeatureDeriver};
use defaulter_model::{
    evaluate, EvaluationScope, ForestParams, ModelArtifact, ModelError, ModelVersion, SplitParams,
    Trainer, TrainingConfig, ARTIFACT_VERSION,
};
use pretty_assertions::assert_eq;

fn derived(rows: usize) -> DerivedTable {
    let now = NaiveDate::from_ymd_opt(2024, 10, 7)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    FeatureDeriver::new("07/10/2024")
        .unwrap()
        .with_clock(FixedClock(now))
        .derive(&synthetic_clinic_table(rows), Encoding::Fit)
        .expect("derive")
}

fn config() -> TrainingConfig {
    TrainingConfig {
        forest: ForestParams {
            n_estimators: 25,
            ..ForestParams::default()
        },
        reference_date: Some("2024-10-07".into()),
        ..TrainingConfig::default()
    }
}

#[test]
fn ten_rows_split_eight_two() {
    let table = derived(10);
    let outcome = Trainer::new(TrainingConfig::default())
        .train(&table)
        .expect("train");

    assert_eq!(outcome.split.x_train.len(), 8);
    assert_eq!(outcome.split.x_test.len(), 2);
    assert_eq!(outcome.artifact.forest.trees().len(), 100);
    assert_eq!(outcome.artifact.metadata.train_rows, 8);
    assert_eq!(outcome.artifact.metadata.test_rows, 2);
    assert!((0.0..=1.0).contains(&outcome.accuracy));
}

#[test]
fn training_is_reproducible() {
    let table = derived(30);
    let a = Trainer::new(config()).train(&table).expect("train a");
    let b = Trainer::new(config()).train(&table).expect("train b");

    assert_eq!(a.split.test_rows, b.split.test_rows);
    assert_eq!(a.artifact.forest, b.artifact.forest);
    assert_abs_diff_eq!(a.accuracy, b.accuracy);
}

#[test]
fn separable_data_scores_perfectly() {
    // Months Of Prescription alone separates the synthetic classes.
    let table = derived(40);
    let outcome = Trainer::new(config()).train(&table).expect("train");
    assert_abs_diff_eq!(outcome.accuracy, 1.0);
    assert_eq!(outcome.artifact.metadata.test_accuracy, Some(1.0));
}

#[test]
fn saved_artifact_predicts_like_the_trained_one() {
    let table = derived(20);
    let outcome = Trainer::new(config()).train(&table).expect("train");

    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("models").join("random_forest_model.json");
    outcome.artifact.save(&path).expect("save");

    let loaded = ModelArtifact::load(&path).expect("load");
    assert_eq!(loaded, outcome.artifact);
    assert_eq!(loaded.format_version, ARTIFACT_VERSION);
    assert_eq!(loaded.metadata.reference_date.as_deref(), Some("2024-10-07"));
    assert_eq!(
        loaded.predict_table(&table).unwrap(),
        outcome.artifact.predict_table(&table).unwrap()
    );
}

#[test]
fn overwriting_replaces_previous_model() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("model.json");

    let small = Trainer::new(config()).train(&derived(10)).expect("train");
    small.artifact.save(&path).expect("save");
    let large = Trainer::new(config()).train(&derived(30)).expect("train");
    large.artifact.save(&path).expect("save again");

    let loaded = ModelArtifact::load(&path).expect("load");
    assert_eq!(loaded.metadata.train_rows, 24);
}

#[test]
fn held_out_evaluation_matches_training_accuracy() {
    let table = derived(30);
    let outcome = Trainer::new(config()).train(&table).expect("train");

    let held_out = evaluate(&outcome.artifact, &table, EvaluationScope::HeldOut).unwrap();
    assert_eq!(held_out.rows, 6);
    assert_abs_diff_eq!(held_out.report.accuracy, outcome.accuracy);

    let full = evaluate(&outcome.artifact, &table, EvaluationScope::Full).unwrap();
    assert_eq!(full.rows, 30);
    let text = full.report.to_string();
    assert!(text.contains("precision"));
    assert!(text.contains("accuracy"));
}

#[test]
fn single_row_cannot_be_split() {
    let table = derived(1);
    let err = Trainer::new(config()).train(&table).unwrap_err();
    assert!(matches!(err, ModelError::EmptySplit { rows: 1, .. }));
}

#[test]
fn missing_model_file_reports_path() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("absent.json");
    let err = ModelArtifact::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn custom_split_params_are_recorded() {
    let table = derived(20);
    let cfg = TrainingConfig {
        split: SplitParams {
            test_ratio: 0.5,
            seed: 7,
        },
        ..config()
    };
    let outcome = Trainer::new(cfg).train(&table).expect("train");
    assert_eq!(outcome.split.x_test.len(), 10);
    assert_eq!(outcome.artifact.metadata.split.seed, 7);
}

#[test]
fn load_rejects_forest_narrower_than_feature_list() {
    let mut artifact = Trainer::new(config()).train(&derived(10)).expect("train").artifact;
    artifact.metadata.feature_names.push("Extra".into());

    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("model.json");
    artifact.save(&path).expect("save");
    let err = ModelArtifact::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ModelError::FeatureCount {
            expected: 11,
            got: 10
        }
    ));
}

#[test]
fn version_and_tags_survive_reload() {
    let cfg = TrainingConfig {
        version: ModelVersion::parse("2.3.1").unwrap(),
        tags: [("input".to_string(), "activeOnART.csv".to_string())].into(),
        ..config()
    };
    let outcome = Trainer::new(cfg).train(&derived(10)).expect("train");

    let tmp = tempfile::tempdir().expect("tmpdir");
    let path = tmp.path().join("model.json");
    outcome.artifact.save(&path).expect("save");
    let loaded = ModelArtifact::load(&path).expect("load");

    assert_eq!(loaded.metadata.version.to_string(), "2.3.1");
    assert_eq!(
        loaded.metadata.tags.get("input").map(String::as_str),
        Some("activeOnART.csv")
    );
}
