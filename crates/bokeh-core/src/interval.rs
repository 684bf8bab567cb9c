//! Sampling ranges for randomized motion parameters.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A half-open range `[min, max)` sampled uniformly.
///
/// An interval with `min == max` always yields `min`, which is how tests
/// pin otherwise random parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A degenerate interval that always samples `value`.
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Draw a value as `min + u * (max - min)` with `u` in `[0, 1)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        self.min + rng.random::<f32>() * (self.max - self.min)
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}
