pub mod functions;
pub mod matrix;
pub mod rng;
