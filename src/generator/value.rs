//! Bounded random sample generation

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::config::ValueRange;

/// Draws metric readings uniformly from a bounded range at fixed precision
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    scale: f64,
    steps: Uniform<u64>,
}

impl ValueGenerator {
    pub fn new(range: &ValueRange) -> Self {
        let scale = range.scale();
        let (low, high) = range.step_bounds();

        Self {
            scale,
            steps: Uniform::new_inclusive(low, high.max(low)),
        }
    }

    /// Draw the next reading
    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.steps.sample(rng) as f64 / self.scale
    }
}
