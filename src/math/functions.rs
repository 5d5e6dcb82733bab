//! Scalar activation math shared by the activation layer and tests.

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}
