//! Time-bounded attribute interpolation.
//!
//! A [`Tween`] lives inside the particle it drives, so a particle can never
//! be driven by two interpolations at once. The [`TweenScheduler`] steps
//! every tween by the frame delta and reports finished tweens as
//! [`TweenCompleted`] events instead of invoking callbacks.

use std::time::Duration;

use bokeh_core::Easing;

use crate::motion::MotionState;
use crate::particle::{Attributes, Particle, ParticleId};

/// Target values of a tween. Attributes left as `None` are not animated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TweenTarget {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub radius: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub alpha: Option<f32>,
}

impl TweenTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn scale(mut self, x: f32, y: f32) -> Self {
        self.scale_x = Some(x);
        self.scale_y = Some(y);
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Write `start + (target - start) * progress` into every targeted attribute.
    fn interpolate(&self, start: &Attributes, progress: f32, out: &mut Attributes) {
        let lerp = |from: f32, to: Option<f32>, slot: &mut f32| {
            if let Some(to) = to {
                *slot = from + (to - from) * progress;
            }
        };
        lerp(start.x, self.x, &mut out.x);
        lerp(start.y, self.y, &mut out.y);
        lerp(start.radius, self.radius, &mut out.radius);
        lerp(start.scale_x, self.scale_x, &mut out.scale_x);
        lerp(start.scale_y, self.scale_y, &mut out.scale_y);
        lerp(start.alpha, self.alpha, &mut out.alpha);
    }

    /// Set every targeted attribute exactly to its target.
    fn settle(&self, out: &mut Attributes) {
        let set = |to: Option<f32>, slot: &mut f32| {
            if let Some(to) = to {
                *slot = to;
            }
        };
        set(self.x, &mut out.x);
        set(self.y, &mut out.y);
        set(self.radius, &mut out.radius);
        set(self.scale_x, &mut out.scale_x);
        set(self.scale_y, &mut out.scale_y);
        set(self.alpha, &mut out.alpha);
    }
}

/// An active interpolation owned by one particle.
#[derive(Debug, Clone)]
pub struct Tween {
    start: Attributes,
    target: TweenTarget,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    on_complete: MotionState,
}

impl Tween {
    /// Snapshot `start` and head for `target`.
    pub fn new(
        start: Attributes,
        target: TweenTarget,
        duration: Duration,
        easing: Easing,
        on_complete: MotionState,
    ) -> Self {
        Self {
            start,
            target,
            duration,
            elapsed: Duration::ZERO,
            easing,
            on_complete,
        }
    }

    /// Attribute values captured when the tween started.
    pub fn start(&self) -> &Attributes {
        &self.start
    }

    pub fn target(&self) -> &TweenTarget {
        &self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// State the particle enters once this tween completes.
    pub fn on_complete(&self) -> MotionState {
        self.on_complete
    }

    /// Normalized time in 0.0-1.0.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Advance by `dt` and write the interpolated values into `attributes`.
    /// Returns `true` once the tween has reached its end.
    fn advance(&mut self, dt: Duration, attributes: &mut Attributes) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.target.settle(attributes);
            return true;
        }
        let eased = self.easing.apply(self.progress());
        self.target.interpolate(&self.start, eased, attributes);
        false
    }
}

/// Completion event for a tween that reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenCompleted {
    pub particle: ParticleId,
    /// State requested by the finished tween.
    pub next: MotionState,
}

/// Steps every particle's tween once per frame.
#[derive(Debug, Default)]
pub struct TweenScheduler {
    /// Completions not yet drained.
    completed: Vec<TweenCompleted>,
    /// Total time stepped so far.
    clock: Duration,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on `particle`, replacing any tween already running there.
    ///
    /// A completion of the particle still waiting to be drained is
    /// withdrawn, so only the new tween can report.
    pub fn start(
        &mut self,
        particle: &mut Particle,
        target: TweenTarget,
        duration: Duration,
        easing: Easing,
        on_complete: MotionState,
    ) {
        self.withdraw(particle.id());
        particle.apply_transition(target, duration, easing, on_complete);
    }

    /// Detach the running tween of `particle` without reporting completion.
    /// Cancelling a particle with no tween is a no-op.
    pub fn cancel(&mut self, particle: &mut Particle) -> bool {
        self.withdraw(particle.id());
        particle.cancel_tween()
    }

    fn withdraw(&mut self, id: ParticleId) {
        self.completed.retain(|event| event.particle != id);
    }

    /// Advance every active tween by `dt`.
    ///
    /// Finished tweens leave their particle with exact target values, are
    /// detached, and queue one [`TweenCompleted`] each.
    pub fn step(&mut self, particles: &mut [Particle], dt: Duration) {
        self.clock = self.clock.saturating_add(dt);
        for particle in particles {
            let finished = match particle.tween_parts() {
                Some((tween, attributes)) => tween.advance(dt, attributes),
                None => continue,
            };
            if !finished {
                continue;
            }
            if let Some(tween) = particle.take_tween() {
                self.completed.push(TweenCompleted {
                    particle: particle.id(),
                    next: tween.on_complete(),
                });
            }
        }
    }

    /// Take every completion queued since the last drain, in pool order.
    pub fn drain_completed(&mut self) -> Vec<TweenCompleted> {
        std::mem::take(&mut self.completed)
    }

    /// Total time stepped since creation.
    pub fn clock(&self) -> Duration {
        self.clock
    }
}
