use rand::Rng;

use deepc::{
    seeded_rng, train_test_split, Activation, FitConfig, Layer, LossType, Matrix, OptimizerKind,
    SequentialModel,
};

const SAMPLES: usize = 200;

fn main() -> deepc::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // y = sin(x1) + 0.5 * x2 with a little noise.
    let mut rng = seeded_rng(7);
    let mut x = Matrix::zeros(SAMPLES, 2)?;
    let mut y = Matrix::zeros(SAMPLES, 1)?;
    for i in 0..SAMPLES {
        let (a, b) = (rng.gen_range(-2.0..2.0), rng.gen_range(-1.0..1.0));
        x[(i, 0)] = a;
        x[(i, 1)] = b;
        y[(i, 0)] = f64::sin(a) + 0.5 * b + rng.gen_range(-0.02..0.02);
    }
    let split = train_test_split(&x, &y, 0.2, &mut rng)?;

    let mut model = SequentialModel::new("regression");
    model.add(Layer::dense(16, Activation::Tanh, 2, &mut rng)?)?;
    model.add(Layer::dense(8, Activation::ReLU, 16, &mut rng)?)?;
    model.add(Layer::dense(1, Activation::Linear, 8, &mut rng)?)?;
    model.compile(OptimizerKind::Adam, LossType::Mse, 0.01)?;

    model.fit(&split.x_train, &split.y_train, &FitConfig::new(200, 16).verbose(false))?;
    println!("train MSE: {:.6}", model.evaluate(&split.x_train, &split.y_train)?);
    println!("test MSE:  {:.6}", model.evaluate(&split.x_test, &split.y_test)?);

    let path = std::env::temp_dir().join("deepc_regression.model");
    model.save_model(&path)?;
    let mut restored = SequentialModel::load_model(&path)?;
    println!(
        "restored model test MSE: {:.6} ({})",
        restored.evaluate(&split.x_test, &split.y_test)?,
        path.display()
    );
    Ok(())
}
