//! Core types shared across the bokeh crates.
//!
//! Everything here is a plain value: colors, geometry, sampling intervals,
//! easing curves and the tuning knobs of the particle motion. All of it is
//! serializable so the configuration crate can persist it as TOML.

mod color;
mod easing;
mod formation;
mod geometry;
mod gradient;
mod interval;
mod tuning;

pub use color::{ParseColorError, Rgb};
pub use easing::Easing;
pub use formation::Formation;
pub use geometry::{Point, Viewport};
pub use gradient::{Gradient, GradientStop};
pub use interval::Interval;
pub use tuning::MotionTuning;
