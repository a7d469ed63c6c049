//! Seeded pseudo-random numbers for reproducible scatter.
//!
//! Backed by ChaCha8, whose output is specified independently of platform
//! and pointer width.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator of floats in `[0, 1)`.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Next value in `[min, max)`.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Closure form: each call yields the next value in `[0, 1)`.
pub fn create_seeded_rng(seed: u64) -> impl FnMut() -> f64 {
    let mut rng = SeededRng::new(seed);
    move || rng.next_f64()
}
