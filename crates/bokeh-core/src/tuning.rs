//! Tuning knobs for particle motion.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::interval::Interval;

/// Every range and constant the motion state machine draws from.
///
/// Durations are in seconds. Defaults reproduce the stock backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Curve shared by every motion tween.
    pub easing: Easing,
    /// Drawn radius of a particle at scale 1.
    pub base_radius: f32,
    /// Opacity assigned at creation.
    pub initial_alpha: Interval,
    /// Length of one drift leg.
    pub float_duration: Interval,
    /// Per-axis offset added to the current position for each drift leg.
    pub float_offset: Interval,
    /// Opacity targeted by each drift leg.
    pub float_alpha: Interval,
    /// Length of one jiggle step.
    pub jiggle_duration: f32,
    /// Per-axis jitter added to the origin for each jiggle step.
    pub jiggle_jitter: Interval,
    pub form_duration: f32,
    pub form_radius: f32,
    pub form_scale: f32,
    pub form_alpha: f32,
    pub disperse_duration: f32,
    pub disperse_alpha: Interval,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            easing: Easing::QuadInOut,
            base_radius: 60.0,
            initial_alpha: Interval::new(0.05, 0.35),
            float_duration: Interval::new(5.0, 8.5),
            float_offset: Interval::new(-100.0, 100.0),
            float_alpha: Interval::new(0.1, 0.6),
            jiggle_duration: 0.05,
            jiggle_jitter: Interval::new(0.0, 3.0),
            form_duration: 0.4,
            form_radius: 5.0,
            form_scale: 0.4,
            form_alpha: 1.0,
            disperse_duration: 0.8,
            disperse_alpha: Interval::new(0.1, 0.6),
        }
    }
}

impl MotionTuning {
    /// Draw the length of the next drift leg.
    pub fn sample_float_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        seconds(self.float_duration.sample(rng))
    }

    pub fn jiggle_duration(&self) -> Duration {
        seconds(self.jiggle_duration)
    }

    pub fn form_duration(&self) -> Duration {
        seconds(self.form_duration)
    }

    pub fn disperse_duration(&self) -> Duration {
        seconds(self.disperse_duration)
    }
}

/// Convert configured seconds to a `Duration`. Negative or NaN values are
/// zero; values too large for a `Duration` saturate at `Duration::MAX`.
pub(crate) fn seconds(value: f32) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_durations() {
        let tuning = MotionTuning::default();
        assert_eq!(tuning.form_duration(), Duration::from_secs_f32(0.4));
        assert_eq!(tuning.disperse_duration(), Duration::from_secs_f32(0.8));
        assert_eq!(tuning.jiggle_duration(), Duration::from_secs_f32(0.05));
    }

    #[test]
    fn test_float_duration_in_range() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let tuning = MotionTuning::default();
        for _ in 0..100 {
            let d = tuning.sample_float_duration(&mut rng);
            assert!(d >= Duration::from_secs(5) && d <= Duration::from_millis(8500));
        }
    }

    #[test]
    fn test_invalid_seconds_are_zero() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f32::NAN), Duration::ZERO);
    }

    #[test]
    fn test_oversized_seconds_saturate() {
        assert_eq!(seconds(1e30), Duration::MAX);
        assert_eq!(seconds(f32::INFINITY), Duration::MAX);

        let tuning = MotionTuning {
            float_duration: Interval::fixed(1e30),
            jiggle_duration: 1e30,
            form_duration: 1e30,
            disperse_duration: 1e30,
            ..MotionTuning::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert_eq!(tuning.sample_float_duration(&mut rng), Duration::MAX);
        assert_eq!(tuning.jiggle_duration(), Duration::MAX);
        assert_eq!(tuning.form_duration(), Duration::MAX);
        assert_eq!(tuning.disperse_duration(), Duration::MAX);
    }
}
