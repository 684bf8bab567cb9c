//! A single drawable particle.

use std::fmt;
use std::time::Duration;

use bokeh_core::{Easing, Point, Rgb};

use crate::motion::MotionState;
use crate::tween::{Tween, TweenTarget};

/// Index of a particle in its pool, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub usize);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The tweenable attributes of a particle.
///
/// Values are never clamped; opacity and scale may leave their usual ranges
/// if the tuning asks for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attributes {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
}

impl Attributes {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A translucent circle with its motion state and active tween.
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    attributes: Attributes,
    base_radius: f32,
    color: Rgb,
    origin: Point,
    state: MotionState,
    tween: Option<Tween>,
}

impl Particle {
    /// Create an idle particle in the `Floating` state.
    pub fn new(
        id: ParticleId,
        color: Rgb,
        origin: Point,
        base_radius: f32,
        attributes: Attributes,
    ) -> Self {
        Self {
            id,
            attributes,
            base_radius,
            color,
            origin,
            state: MotionState::Floating,
            tween: None,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn position(&self) -> Point {
        self.attributes.position()
    }

    pub fn alpha(&self) -> f32 {
        self.attributes.alpha
    }

    pub fn radius(&self) -> f32 {
        self.attributes.radius
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.attributes.scale_x, self.attributes.scale_y)
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Palette color fixed at creation.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Formation target fixed at creation.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    pub fn has_active_tween(&self) -> bool {
        self.tween.is_some()
    }

    /// Drawn half-extents: the base radius scaled on each axis.
    pub fn extent(&self) -> (f32, f32) {
        (
            (self.base_radius * self.attributes.scale_x).abs(),
            (self.base_radius * self.attributes.scale_y).abs(),
        )
    }

    /// Replace any running tween with one heading for `target`.
    ///
    /// The new tween starts from the attribute values at this instant.
    /// The replaced tween is dropped without reporting completion.
    pub fn apply_transition(
        &mut self,
        target: TweenTarget,
        duration: Duration,
        easing: Easing,
        on_complete: MotionState,
    ) {
        self.cancel_tween();
        self.tween = Some(Tween::new(
            self.attributes,
            target,
            duration,
            easing,
            on_complete,
        ));
    }

    /// Detach the running tween, if any. Returns whether one was running.
    pub fn cancel_tween(&mut self) -> bool {
        self.tween.take().is_some()
    }

    pub(crate) fn set_state(&mut self, state: MotionState) {
        self.state = state;
    }

    /// Split borrow used by the scheduler to drive the tween against the
    /// attributes it owns.
    pub(crate) fn tween_parts(&mut self) -> Option<(&mut Tween, &mut Attributes)> {
        self.tween.as_mut().map(|tween| (tween, &mut self.attributes))
    }

    pub(crate) fn take_tween(&mut self) -> Option<Tween> {
        self.tween.take()
    }
}
