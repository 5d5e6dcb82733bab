use deepc::data::dataset;
use deepc::{seeded_rng, Activation, FitConfig, Layer, LossType, OptimizerKind, SequentialModel};

fn main() -> deepc::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (inputs, targets) = dataset::xor()?;
    let mut rng = seeded_rng(42);

    let mut model = SequentialModel::new("xor");
    model.add(Layer::dense(4, Activation::Tanh, 2, &mut rng)?)?;
    model.add(Layer::dense(1, Activation::Sigmoid, 4, &mut rng)?)?;
    model.compile(OptimizerKind::Adam, LossType::BinaryCrossEntropy, 0.05)?;
    println!("{model}");

    let history = model.fit(&inputs, &targets, &FitConfig::new(500, 4))?;
    println!("final loss: {:.6}", history.final_loss().unwrap_or(f64::NAN));

    let outputs = model.predict(&inputs)?;
    for i in 0..inputs.rows() {
        println!("Input: {:?} -> Output: {:.4}", inputs.row(i), outputs[(i, 0)]);
    }
    println!("accuracy: {:.2}", model.accuracy(&inputs, &targets)?);
    Ok(())
}
