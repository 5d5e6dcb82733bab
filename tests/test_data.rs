use std::collections::HashSet;
use std::fs;

use deepc::data::{
    count_missing, features_without_column, fill_missing_with_mean, label_column, load_csv,
};
use deepc::{
    seeded_rng, train_test_split, Activation, FitConfig, Layer, LossType, Matrix, OptimizerKind,
    SequentialModel,
};
use tempfile::tempdir;

#[test]
fn split_ten_rows_eighty_twenty() {
    let x = Matrix::from_vec(10, 2, (0..20).map(|i| i as f64).collect()).unwrap();
    let y = Matrix::from_vec(10, 1, (0..10).map(|i| i as f64).collect()).unwrap();
    let split = train_test_split(&x, &y, 0.2, &mut seeded_rng(42)).unwrap();

    assert_eq!(split.x_train.shape(), (8, 2));
    assert_eq!(split.x_test.shape(), (2, 2));
    assert_eq!(split.y_train.rows(), 8);
    assert_eq!(split.y_test.rows(), 2);

    let train: HashSet<usize> = split.train_indices.iter().copied().collect();
    let test: HashSet<usize> = split.test_indices.iter().copied().collect();
    assert!(train.is_disjoint(&test));
    assert_eq!(train.union(&test).count(), 10);

    for (row, &idx) in split.test_indices.iter().enumerate() {
        assert_eq!(split.y_test[(row, 0)], idx as f64);
        assert_eq!(split.x_test.row(row), x.row(idx));
    }
}

#[test]
fn same_seed_same_split() {
    let x = Matrix::from_vec(10, 1, (0..10).map(|i| i as f64).collect()).unwrap();
    let a = train_test_split(&x, &x, 0.3, &mut seeded_rng(1)).unwrap();
    let b = train_test_split(&x, &x, 0.3, &mut seeded_rng(1)).unwrap();
    assert_eq!(a.test_indices, b.test_indices);
}

#[test]
fn csv_to_trained_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(
        &path,
        "f1,f2,label\n0,0,0\n0,1,1\n1,NA,1\n1,1,1\n0.5,,1\n0,0.2,0\n",
    )
    .unwrap();

    let mut data = load_csv(&path, true).unwrap();
    assert_eq!(data.shape(), (6, 3));
    assert_eq!(count_missing(&data), 2);
    fill_missing_with_mean(&mut data);
    assert_eq!(count_missing(&data), 0);
    // Mean of the observed f2 values: (0 + 1 + 1 + 0.2) / 4.
    assert!((data[(2, 1)] - 0.55).abs() < 1e-12);

    let x = features_without_column(&data, 2).unwrap();
    let y = label_column(&data, 2).unwrap();
    assert_eq!(x.shape(), (6, 2));

    let mut model = SequentialModel::new("csv");
    model
        .add(Layer::dense(1, Activation::Sigmoid, 2, &mut seeded_rng(6)).unwrap())
        .unwrap();
    model
        .compile(OptimizerKind::Sgd, LossType::BinaryCrossEntropy, 0.5)
        .unwrap();
    let history = model.fit(&x, &y, &FitConfig::new(50, 3)).unwrap();
    assert!(history.final_loss().unwrap() < history.losses()[0]);
}

#[test]
fn missing_csv_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_csv(dir.path().join("nope.csv"), true),
        Err(deepc::NnError::Io(_))
    ));
}
