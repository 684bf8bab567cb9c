//! Per-particle motion state machine.
//!
//! | State    | Cause               | Heads for                          | Then     |
//! |----------|---------------------|------------------------------------|----------|
//! | Floating | settled             | position + offset, new opacity     | Floating |
//! | Jiggling | settled             | origin + jitter                    | Jiggling |
//! | any      | `Trigger::Form`     | origin, small radius/scale, opaque | Jiggling |
//! | any      | `Trigger::Disperse` | random viewport spot, scale 1      | Floating |

use std::fmt;
use std::time::Duration;

use bokeh_core::{Easing, MotionTuning, Viewport};
use rand::Rng;

use crate::particle::Particle;
use crate::tween::{TweenScheduler, TweenTarget};

/// Motion state of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionState {
    /// Ambient drift, the initial state.
    #[default]
    Floating,
    /// Small idle motion around the formation origin.
    Jiggling,
    /// Converging on the formation origin.
    Forming,
    /// Scattering away from the formation.
    Dispersing,
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotionState::Floating => "floating",
            MotionState::Jiggling => "jiggling",
            MotionState::Forming => "forming",
            MotionState::Dispersing => "dispersing",
        };
        f.write_str(name)
    }
}

/// External trigger that preempts whatever a particle is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Form,
    Disperse,
}

/// A planned tween together with the state it runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State of the particle while the tween runs.
    pub state: MotionState,
    pub target: TweenTarget,
    pub duration: Duration,
    pub easing: Easing,
    /// State entered when the tween completes.
    pub then: MotionState,
}

impl Transition {
    /// Put the particle in the transition's state and start its tween on
    /// `scheduler`, replacing whatever tween was running.
    pub fn begin(self, scheduler: &mut TweenScheduler, particle: &mut Particle) {
        particle.set_state(self.state);
        scheduler.start(particle, self.target, self.duration, self.easing, self.then);
    }
}

/// Looks up the next transition from the table and draws its random parameters.
#[derive(Debug, Clone)]
pub struct MotionMachine {
    tuning: MotionTuning,
    viewport: Viewport,
}

impl MotionMachine {
    pub fn new(tuning: MotionTuning, viewport: Viewport) -> Self {
        Self { tuning, viewport }
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Self-loop transition for a particle whose tween just completed.
    ///
    /// Particles that settle while forming idle as jiggling; those that
    /// settle while dispersing drift as floating.
    pub fn settled<R: Rng + ?Sized>(&self, particle: &Particle, rng: &mut R) -> Transition {
        match particle.state() {
            MotionState::Floating | MotionState::Dispersing => self.float(particle, rng),
            MotionState::Jiggling | MotionState::Forming => self.jiggle(particle, rng),
        }
    }

    /// Transition for an external trigger, regardless of current state.
    pub fn triggered<R: Rng + ?Sized>(
        &self,
        trigger: Trigger,
        particle: &Particle,
        rng: &mut R,
    ) -> Transition {
        match trigger {
            Trigger::Form => self.form(particle),
            Trigger::Disperse => self.disperse(rng),
        }
    }

    fn float<R: Rng + ?Sized>(&self, particle: &Particle, rng: &mut R) -> Transition {
        let t = &self.tuning;
        let position = particle
            .position()
            .offset(t.float_offset.sample(rng), t.float_offset.sample(rng));
        Transition {
            state: MotionState::Floating,
            target: TweenTarget::new()
                .position(position.x, position.y)
                .alpha(t.float_alpha.sample(rng)),
            duration: t.sample_float_duration(rng),
            easing: t.easing,
            then: MotionState::Floating,
        }
    }

    fn jiggle<R: Rng + ?Sized>(&self, particle: &Particle, rng: &mut R) -> Transition {
        let t = &self.tuning;
        let position = particle
            .origin()
            .offset(t.jiggle_jitter.sample(rng), t.jiggle_jitter.sample(rng));
        Transition {
            state: MotionState::Jiggling,
            target: TweenTarget::new().position(position.x, position.y),
            duration: t.jiggle_duration(),
            easing: t.easing,
            then: MotionState::Jiggling,
        }
    }

    fn form(&self, particle: &Particle) -> Transition {
        let t = &self.tuning;
        let origin = particle.origin();
        Transition {
            state: MotionState::Forming,
            target: TweenTarget::new()
                .position(origin.x, origin.y)
                .radius(t.form_radius)
                .scale(t.form_scale, t.form_scale)
                .alpha(t.form_alpha),
            duration: t.form_duration(),
            easing: t.easing,
            then: MotionState::Jiggling,
        }
    }

    fn disperse<R: Rng + ?Sized>(&self, rng: &mut R) -> Transition {
        let t = &self.tuning;
        let x = rng.random::<f32>() * self.viewport.width;
        let y = rng.random::<f32>() * self.viewport.height;
        Transition {
            state: MotionState::Dispersing,
            target: TweenTarget::new()
                .position(x, y)
                .alpha(t.disperse_alpha.sample(rng))
                .scale(1.0, 1.0),
            duration: t.disperse_duration(),
            easing: t.easing,
            then: MotionState::Floating,
        }
    }
}
