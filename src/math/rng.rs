use rand::{rngs::StdRng, SeedableRng};

/// Deterministic generator for weight initialization and shuffling.
///
/// Nothing in the crate keeps a global generator: every function that needs
/// randomness takes `&mut impl Rng`, so callers choose between a seeded
/// `StdRng` from here and `rand::thread_rng()`.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let a: Vec<f64> = seeded_rng(7).sample_iter(rand::distributions::Standard).take(4).collect();
        let b: Vec<f64> = seeded_rng(7).sample_iter(rand::distributions::Standard).take(4).collect();
        assert_eq!(a, b);
    }
}
