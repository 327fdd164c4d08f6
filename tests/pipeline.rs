//! End-to-end runs over spambase-shaped CSV files.

use std::io::Write;

use spam_bayes::{
    cross_validate, evaluate, holdout, run, BayesError, ClassMeans, Dataset, Discretizer,
    EvalConfig, LabeledSet, LikelihoodCache, Report, NOT_SPAM, NUM_FEATURES, SPAM,
};

fn row(value: f64, label: u8) -> String {
    let mut fields = vec![format!("{value}"); NUM_FEATURES];
    fields.push(label.to_string());
    fields.join(",")
}

/// Spam rows around 1.0, not-spam rows around 0.0, labels alternating.
fn write_dataset(rows: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..rows {
        let label = (i % 2) as u8;
        let value = label as f64 + (i % 7) as f64 * 0.02 - 0.06;
        writeln!(file, "{}", row(value, label)).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn closer_mean_scenario() {
    let training = Dataset::from_reader(
        [row(1.0, 1), row(1.0, 1), row(0.0, 0), row(0.0, 0)]
            .join("\n")
            .as_bytes(),
    )
    .unwrap();
    let means = ClassMeans::fit(&training).unwrap();
    assert_eq!(means.spam()[0], 1.0);
    assert_eq!(means.not_spam()[0], 0.0);

    let mut sample = vec![0.0; NUM_FEATURES];
    sample[0] = 0.9;
    let symbols = means.transform_row(&sample).unwrap();
    assert_eq!(symbols[0], 1);
    assert!(symbols[1..].iter().all(|&s| s == 0));
}

#[test]
fn loads_file_and_runs_holdout() {
    let file = write_dataset(60);
    let dataset = Dataset::from_path(file.path()).unwrap();
    assert_eq!(dataset.len(), 60);

    let counts = holdout(&dataset, 0.66, Discretizer::MeanDistance).unwrap();
    assert_eq!(counts.total(), 60 - 39);
    assert_eq!(counts.accuracy().unwrap(), 1.0);
}

#[test]
fn shuffled_cross_validation_conserves_counts() {
    let file = write_dataset(100);
    let dataset = Dataset::from_path(file.path()).unwrap();
    let config = EvalConfig {
        folds: Some(10),
        seed: Some(3),
        ..Default::default()
    };

    match run(dataset, &config).unwrap() {
        Report::CrossValidation(report) => {
            assert_eq!(report.folds.len(), 10);
            assert!(report.folds.iter().all(|fold| fold.total() == 10));
            assert_eq!(report.total().total(), 100);
        }
        other => panic!("expected cross-validation, got {other:?}"),
    }
}

#[test]
fn quantile_cross_validation_runs() {
    let file = write_dataset(40);
    let dataset = Dataset::from_path(file.path()).unwrap();
    let report = cross_validate(&dataset, 4, Discretizer::Quantile { buckets: 3 }).unwrap();
    assert_eq!(report.total().total(), 40);
}

#[test]
fn malformed_file_aborts_loading() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", row(0.5, 1)).unwrap();
    writeln!(file, "{}", row(0.5, 3)).unwrap();
    file.flush().unwrap();

    match Dataset::from_path(file.path()) {
        Err(BayesError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_class_in_training_fold_is_reported() {
    let training = LabeledSet::new(vec![vec![0u32; 3]; 4], vec![NOT_SPAM; 4]).unwrap();
    let testing = LabeledSet::new(vec![vec![0u32; 3]], vec![SPAM]).unwrap();

    assert!(matches!(
        evaluate(&training, &testing),
        Err(BayesError::EmptyClass { label: SPAM })
    ));

    let mut cache = LikelihoodCache::new(&training);
    assert_eq!(cache.query(2, 1, NOT_SPAM).unwrap(), 0.0);
}

#[test]
fn non_binary_labels_never_reach_the_classifier() {
    assert!(matches!(
        LabeledSet::new(vec![vec![1.0], vec![0.0]], vec![1, 2]),
        Err(BayesError::InvalidParameter { name: "label", .. })
    ));
}
