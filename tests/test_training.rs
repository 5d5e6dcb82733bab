use deepc::data::dataset;
use deepc::train::train_step;
use deepc::{
    seeded_rng, Activation, AdamConfig, BatchErrorPolicy, FitConfig, Layer, LossType, Matrix,
    NnError, OptimizerKind, SequentialModel, TimestepPolicy,
};

/// 25-point grid over {-1, -0.5, 0, 0.5, 1}² with y = 2·x1 - 3·x2 + 1.
fn linear_dataset() -> (Matrix, Matrix) {
    let ticks = [-1.0, -0.5, 0.0, 0.5, 1.0];
    let mut x = Vec::new();
    let mut y = Vec::new();
    for a in ticks {
        for b in ticks {
            x.extend([a, b]);
            y.push(2.0 * a - 3.0 * b + 1.0);
        }
    }
    (Matrix::from_vec(25, 2, x).unwrap(), Matrix::from_vec(25, 1, y).unwrap())
}

fn two_layer_model(seed: u64) -> SequentialModel {
    let mut rng = seeded_rng(seed);
    let mut model = SequentialModel::new("two_layer");
    model.add(Layer::dense(3, Activation::Tanh, 2, &mut rng).unwrap()).unwrap();
    model.add(Layer::dense(1, Activation::Sigmoid, 3, &mut rng).unwrap()).unwrap();
    model
}

#[test]
fn sgd_fits_linear_function() {
    let (x, y) = linear_dataset();
    let mut model = SequentialModel::new("linear");
    model
        .add(Layer::dense(1, Activation::Linear, 2, &mut seeded_rng(3)).unwrap())
        .unwrap();
    model.compile(OptimizerKind::Sgd, LossType::Mse, 0.5).unwrap();

    let history = model.fit(&x, &y, &FitConfig::new(1000, 0).verbose(false)).unwrap();
    let losses = history.losses();
    assert_eq!(losses.len(), 1000);
    assert!(losses.windows(2).all(|w| w[1] <= w[0] + 1e-15));
    assert!(history.final_loss().unwrap() < 1e-6);

    let w = model.layers()[0].weights();
    assert!((w[(0, 0)] - 2.0).abs() < 1e-3);
    assert!((w[(0, 1)] + 3.0).abs() < 1e-3);
    assert!((model.layers()[0].biases()[(0, 0)] - 1.0).abs() < 1e-3);
    assert!(model.evaluate(&x, &y).unwrap() < 1e-6);
}

#[test]
fn adam_timestep_advances_per_layer_by_default() {
    let (x, y) = dataset::xor().unwrap();
    let mut model = two_layer_model(5);
    model.compile(OptimizerKind::Adam, LossType::Mse, 0.01).unwrap();
    model.fit(&x, &y, &FitConfig::new(1, 4).verbose(false)).unwrap();
    assert_eq!(model.optimizer().unwrap().timestep(), 2);
}

#[test]
fn adam_timestep_can_advance_per_training_step() {
    let (x, y) = dataset::xor().unwrap();
    let mut model = two_layer_model(5);
    let config = AdamConfig {
        timestep_policy: TimestepPolicy::PerTrainingStep,
        ..AdamConfig::default()
    };
    model
        .compile_with(OptimizerKind::Adam, LossType::Mse, 0.01, config)
        .unwrap();
    // Two batches of two samples each.
    model.fit(&x, &y, &FitConfig::new(1, 2).verbose(false)).unwrap();
    assert_eq!(model.optimizer().unwrap().timestep(), 2);
}

#[test]
fn adam_reduces_xor_loss() {
    let (x, y) = dataset::xor().unwrap();
    let mut model = SequentialModel::new("xor");
    let mut rng = seeded_rng(42);
    model.add(Layer::dense(4, Activation::Tanh, 2, &mut rng).unwrap()).unwrap();
    model.add(Layer::dense(1, Activation::Sigmoid, 4, &mut rng).unwrap()).unwrap();
    model
        .compile(OptimizerKind::Adam, LossType::BinaryCrossEntropy, 0.05)
        .unwrap();

    let history = model.fit(&x, &y, &FitConfig::new(500, 4).verbose(false)).unwrap();
    let losses = history.losses();
    assert!(losses.iter().all(|l| l.is_finite()));
    assert!(history.final_loss().unwrap() < 0.5 * losses[0]);
}

#[test]
fn softmax_classifier_separates_clusters() {
    let centers = [(2.0, 0.0), (-2.0, 0.0), (0.0, 2.0)];
    let offsets = [(0.1, 0.1), (-0.1, 0.2), (0.2, -0.1), (-0.2, -0.2)];
    let mut x = Vec::new();
    let mut labels = Vec::new();
    for (class, (cx, cy)) in centers.iter().enumerate() {
        for (dx, dy) in offsets {
            x.extend([cx + dx, cy + dy]);
            labels.push(class as f64);
        }
    }
    let x = Matrix::from_vec(12, 2, x).unwrap();
    let y = dataset::one_hot(&Matrix::from_vec(12, 1, labels).unwrap(), 3).unwrap();

    let mut model = SequentialModel::new("clusters");
    model
        .add(Layer::dense(3, Activation::Softmax, 2, &mut seeded_rng(17)).unwrap())
        .unwrap();
    model
        .compile(OptimizerKind::Adam, LossType::CategoricalCrossEntropy, 0.05)
        .unwrap();

    let history = model.fit(&x, &y, &FitConfig::new(300, 0).verbose(false)).unwrap();
    assert!(history.final_loss().unwrap() < 0.5 * history.losses()[0]);
    assert_eq!(model.accuracy(&x, &y).unwrap(), 1.0);
}

#[test]
fn bad_batches_abort_or_are_skipped() {
    let x = Matrix::from_vec(4, 2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
    let y = Matrix::from_vec(4, 1, vec![0.0, 1.0, f64::NAN, 0.0]).unwrap();

    let mut model = two_layer_model(9);
    model.compile(OptimizerKind::Sgd, LossType::Mse, 0.1).unwrap();
    let abort = model.fit(&x, &y, &FitConfig::new(1, 2).verbose(false));
    assert!(matches!(abort, Err(NnError::NumericalInstability(_))));

    let config = FitConfig::new(3, 2)
        .verbose(false)
        .on_batch_error(BatchErrorPolicy::SkipBatch);
    let history = model.fit(&x, &y, &config).unwrap();
    for epoch in &history.epochs {
        assert_eq!(epoch.skipped_batches, 1);
        assert!(epoch.loss.is_finite());
    }

    // Every batch fails: the epoch loss is undefined.
    let all_nan = Matrix::filled(4, 1, f64::NAN).unwrap();
    let history = model.fit(&x, &all_nan, &config).unwrap();
    assert!(history.final_loss().unwrap().is_nan());
}

#[test]
fn fit_validates_dataset_shape() {
    let mut model = two_layer_model(1);
    model.compile(OptimizerKind::Sgd, LossType::Mse, 0.1).unwrap();
    let x = Matrix::zeros(4, 3).unwrap();
    let y = Matrix::zeros(4, 1).unwrap();
    assert!(matches!(
        model.fit(&x, &y, &FitConfig::new(1, 1)),
        Err(NnError::InvalidDimension(_))
    ));
    let x = Matrix::zeros(3, 2).unwrap();
    assert!(model.fit(&x, &y, &FitConfig::new(1, 1)).is_err());
}

fn parameters(model: &SequentialModel) -> Vec<f64> {
    model
        .layers()
        .iter()
        .flat_map(|l| l.weights().as_slice().iter().chain(l.biases().as_slice()).copied())
        .collect()
}

#[test]
fn fit_uses_contiguous_batches_in_row_order() {
    let x = Matrix::from_rows(vec![
        vec![0.1, 0.9],
        vec![0.8, -0.3],
        vec![-0.5, 0.4],
        vec![0.7, 0.2],
    ])
    .unwrap();
    let y = Matrix::from_vec(4, 1, vec![1.0, 0.0, 0.0, 1.0]).unwrap();

    let mut fitted = two_layer_model(12);
    fitted.compile(OptimizerKind::Sgd, LossType::Mse, 0.5).unwrap();
    let mut stepped = fitted.clone();
    let mut reversed = fitted.clone();

    fitted.fit(&x, &y, &FitConfig::new(1, 2)).unwrap();

    for (start, end) in [(0, 2), (2, 4)] {
        let (xb, yb) = (x.slice_rows(start, end).unwrap(), y.slice_rows(start, end).unwrap());
        train_step(&mut stepped, &xb, &yb).unwrap();
    }
    assert_eq!(parameters(&fitted), parameters(&stepped));

    for (start, end) in [(2, 4), (0, 2)] {
        let (xb, yb) = (x.slice_rows(start, end).unwrap(), y.slice_rows(start, end).unwrap());
        train_step(&mut reversed, &xb, &yb).unwrap();
    }
    assert_ne!(parameters(&fitted), parameters(&reversed));
}
