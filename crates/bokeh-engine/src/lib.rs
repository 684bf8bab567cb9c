//! Particle animation engine for the bokeh backdrop.
//!
//! A fixed pool of translucent circles drifts over a gradient. Each particle
//! is driven by at most one tween at a time; when a tween completes the
//! motion state machine picks the next one. Two external triggers make the
//! particles converge into a formation and scatter again.

mod engine;
mod error;
mod motion;
mod particle;
mod pool;
mod render_loop;
mod surface;
mod tween;

pub use engine::{Engine, EngineParams, Selection};
pub use error::EngineError;
pub use motion::{MotionMachine, MotionState, Transition, Trigger};
pub use particle::{Attributes, Particle, ParticleId};
pub use pool::ParticlePool;
pub use render_loop::{RenderHandle, RenderLoop};
pub use surface::{Raster, Surface};
pub use tween::{Tween, TweenCompleted, TweenScheduler, TweenTarget};
