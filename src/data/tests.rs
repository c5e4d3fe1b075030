use super::*;

#[test]
fn test_load_dataset_shape() {
    let (data, scaler) = load_dataset(false);

    assert_eq!(data.len(), 150);
    assert_eq!(data.target.len(), 150);
    assert_eq!(data.feature_names.len(), 4);
    assert_eq!(data.target_names, vec!["setosa", "versicolor", "virginica"]);
    assert!(!data.normalized);
    assert!(scaler.is_none());

    assert!(data.target.iter().all(|&y| y < N_CLASSES));
    assert_eq!(data.features[0], [5.1, 3.5, 1.4, 0.2]);
    assert_eq!(data.target[0], 0);
    assert_eq!(data.target[149], 2);
}

#[test]
fn test_load_dataset_normalized() {
    let (data, scaler) = load_dataset(true);
    assert!(data.normalized);
    assert!(scaler.is_some());

    let summary = summarize(&data.features, &data.target);
    for j in 0..N_FEATURES {
        assert!(summary.feature_stats.mean[j].abs() < 1e-10, "mean[{j}]");
        assert!((summary.feature_stats.std[j] - 1.0).abs() < 1e-10, "std[{j}]");
    }
}

#[test]
fn test_scaler_statistics_come_from_full_table() {
    let (_, scaler) = load_dataset(true);
    let scaler = scaler.unwrap();

    // Column means of the full 150-row table
    let expected = [5.843333333333333, 3.0573333333333337, 3.758, 1.1993333333333334];
    for j in 0..N_FEATURES {
        assert!((scaler.mean[j] - expected[j]).abs() < 1e-9);
    }
}

#[test]
fn test_scaler_constant_column() {
    let rows = vec![[1.0, 2.0, 3.0, 4.0], [1.0, 4.0, 3.0, 8.0]];
    let scaler = Scaler::fit(&rows);
    assert_eq!(scaler.std[0], 1.0);
    assert_eq!(scaler.transform(&rows[0])[0], 0.0);
    assert_eq!(scaler.transform(&rows[1])[1], 1.0);
}

#[test]
fn test_split_default_sizes_and_strata() {
    let (data, _) = load_dataset(false);
    let split = split_dataset(&data.features, &data.target, 0.2, 42).unwrap();

    assert_eq!(split.x_train.len(), 120);
    assert_eq!(split.x_test.len(), 30);
    assert_eq!(split.y_train.len(), 120);
    assert_eq!(split.y_test.len(), 30);

    let test_counts = summarize(&split.x_test, &split.y_test).class_distribution;
    for class in 0..N_CLASSES {
        let n = test_counts.get(&class).copied().unwrap_or(0);
        assert!((9..=11).contains(&n), "class {class} has {n} test rows");
    }
}

#[test]
fn test_split_is_deterministic() {
    let (data, _) = load_dataset(false);
    let a = split_dataset(&data.features, &data.target, 0.2, 42).unwrap();
    let b = split_dataset(&data.features, &data.target, 0.2, 42).unwrap();
    assert_eq!(a, b);

    let c = split_dataset(&data.features, &data.target, 0.2, 7).unwrap();
    assert_ne!(a.x_test, c.x_test);
}

#[test]
fn test_split_covers_every_row_once() {
    let rows: Vec<usize> = (0..150).collect();
    let (data, _) = load_dataset(false);
    let split = split_dataset(&rows, &data.target, 0.3, 123).unwrap();

    assert_eq!(split.x_train.len(), 105);
    assert_eq!(split.x_test.len(), 45);

    let mut all: Vec<usize> = split.x_train.iter().chain(&split.x_test).copied().collect();
    all.sort_unstable();
    assert_eq!(all, rows);

    for (row, label) in split.x_test.iter().zip(&split.y_test) {
        assert_eq!(data.target[*row], *label);
    }
}

#[test]
fn test_split_unbalanced_labels() {
    let features: Vec<[f64; 2]> = (0..100).map(|i| [i as f64, 0.0]).collect();
    let target: Vec<usize> = (0..100).map(|i| if i < 70 { 0 } else if i < 95 { 1 } else { 2 }).collect();

    let split = split_dataset(&features, &target, 0.2, 1).unwrap();
    assert_eq!(split.x_train.len(), 80);
    assert_eq!(split.x_test.len(), 20);

    let counts = summarize(&split.x_test, &split.y_test).class_distribution;
    assert_eq!(counts.get(&0), Some(&14));
    assert_eq!(counts.get(&1), Some(&5));
    assert_eq!(counts.get(&2), Some(&1));
}

#[test]
fn test_split_rejects_bad_input() {
    let rows = vec![[0.0; 4]; 10];
    let labels = vec![0; 10];

    assert_eq!(
        split_dataset(&rows, &labels, 0.0, 42),
        Err(DataError::InvalidTestFraction(0.0))
    );
    assert_eq!(
        split_dataset(&rows, &labels, 1.0, 42),
        Err(DataError::InvalidTestFraction(1.0))
    );
    assert_eq!(
        split_dataset(&rows, &labels[..5], 0.2, 42),
        Err(DataError::LengthMismatch { features: 10, target: 5 })
    );
    let empty: Vec<[f64; 4]> = Vec::new();
    assert_eq!(split_dataset(&empty, &[], 0.2, 42), Err(DataError::Empty));
    assert!(matches!(
        split_dataset(&rows[..1], &labels[..1], 0.5, 42),
        Err(DataError::DegenerateSplit { .. })
    ));
}

#[test]
fn test_summary_values() {
    let x = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    let y = vec![0, 1, 0];

    let summary = summarize(&x, &y);
    assert_eq!(summary.n_samples, 3);
    assert_eq!(summary.n_features, 2);
    assert_eq!(summary.n_classes, 2);
    assert_eq!(summary.class_distribution.get(&0), Some(&2));
    assert_eq!(summary.class_distribution.get(&1), Some(&1));
    assert_eq!(summary.feature_stats.mean, vec![3.0, 4.0]);
    assert!((summary.feature_stats.std[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_summary_empty() {
    let x: Vec<[f64; 4]> = Vec::new();
    let summary = summarize(&x, &[]);
    assert_eq!(summary.n_samples, 0);
    assert_eq!(summary.n_classes, 0);
    assert!(summary.feature_stats.mean.is_empty());
}

#[test]
fn test_prepare_data_pipeline() {
    let prepared = prepare_data_pipeline(false, DEFAULT_TEST_FRACTION, DEFAULT_SEED).unwrap();
    assert_eq!(prepared.x_train.len(), 120);
    assert_eq!(prepared.x_test.len(), 30);
    assert_eq!(prepared.train_summary.n_samples, 120);
    assert_eq!(prepared.test_summary.n_samples, 30);
    assert_eq!(prepared.train_summary.n_features, 4);
    assert!(!prepared.normalized);

    let custom = prepare_data_pipeline(false, 0.3, 123).unwrap();
    assert_eq!(custom.x_train.len(), 105);
    assert_eq!(custom.x_test.len(), 45);
}

#[test]
fn test_prepare_data_pipeline_normalized() {
    let prepared = prepare_data_pipeline(true, DEFAULT_TEST_FRACTION, DEFAULT_SEED).unwrap();
    assert!(prepared.normalized);
    assert_eq!(prepared.scaler, load_dataset(true).1);
    assert!(prepare_data_pipeline(false, 0.2, 42).unwrap().scaler.is_none());

    let combined: Vec<[f64; 4]> = prepared
        .x_train
        .iter()
        .chain(&prepared.x_test)
        .copied()
        .collect();
    let stats = summarize(&combined, &[]).feature_stats;
    assert!(stats.mean.iter().all(|m| m.abs() < 0.5));
    assert!(stats.std.iter().all(|s| *s > 0.5 && *s < 1.5));
}
