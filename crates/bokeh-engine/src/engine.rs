//! The engine: one surface, one particle pool, one render task.

use std::time::Duration;

use bokeh_core::{Formation, Gradient, MotionTuning, Rgb, Viewport};
use log::{debug, info, trace};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{Frame, layout::Rect};

use crate::error::EngineError;
use crate::motion::{MotionMachine, Trigger};
use crate::particle::{Particle, ParticleId};
use crate::pool::ParticlePool;
use crate::render_loop::{RenderHandle, RenderLoop};
use crate::surface::Surface;
use crate::tween::TweenScheduler;

/// Default number of particles.
pub const DEFAULT_PARTICLE_COUNT: usize = 100;

/// Particles addressed by a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Particle(ParticleId),
}

impl From<ParticleId> for Selection {
    fn from(id: ParticleId) -> Self {
        Selection::Particle(id)
    }
}

/// Initialization parameters of an [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub particle_count: usize,
    pub palette: Vec<Rgb>,
    /// Host viewport, read once.
    pub viewport: Viewport,
    /// Identifier of the container the surface is mounted in.
    pub container: String,
    /// Surface height; the viewport height when unset.
    pub surface_height: Option<f32>,
    /// Logical units per surface raster pixel.
    pub pixel_size: f32,
    pub formation: Formation,
    pub background: Gradient,
    pub tuning: MotionTuning,
    /// Fixed RNG seed; drawn from the OS when unset.
    pub seed: Option<u64>,
}

impl EngineParams {
    pub fn new(viewport: Viewport, palette: Vec<Rgb>) -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            palette,
            viewport,
            container: "stage".to_string(),
            surface_height: None,
            pixel_size: 8.0,
            formation: Formation::default(),
            background: Gradient::default(),
            tuning: MotionTuning::default(),
            seed: None,
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tuning(mut self, tuning: MotionTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = formation;
        self
    }
}

/// A self-contained particle backdrop.
///
/// Several engines can coexist; each owns its surface, pool, scheduler,
/// random source and render handle.
#[derive(Debug)]
pub struct Engine {
    viewport: Viewport,
    surface: Surface,
    scheduler: TweenScheduler,
    motion: MotionMachine,
    rng: StdRng,
    render: RenderHandle,
}

impl Engine {
    /// Spawn the pool, paint the surface and start every particle drifting.
    pub fn new(params: EngineParams) -> Result<Self, EngineError> {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let pool = ParticlePool::spawn(
            params.particle_count,
            &params.palette,
            params.formation,
            params.viewport,
            &params.tuning,
            &mut rng,
        )?;

        let height = params.surface_height.unwrap_or(params.viewport.height);
        let surface = Surface::new(
            params.container,
            params.viewport,
            height,
            params.pixel_size,
            &params.background,
            pool,
        );

        let mut engine = Self {
            viewport: params.viewport,
            surface,
            scheduler: TweenScheduler::new(),
            motion: MotionMachine::new(params.tuning, params.viewport),
            rng,
            render: RenderHandle::new(),
        };

        for particle in engine.surface.children_mut().iter_mut() {
            engine
                .motion
                .settled(particle, &mut engine.rng)
                .begin(&mut engine.scheduler, particle);
        }

        info!(
            "engine `{}` created: {} particles over {}x{}",
            engine.surface.container(),
            engine.surface.children().len(),
            engine.viewport.width,
            engine.viewport.height,
        );
        Ok(engine)
    }

    /// Step every tween by `dt`, then start the follow-up tween of each
    /// particle whose tween completed during the step.
    pub fn advance(&mut self, dt: Duration) {
        self.scheduler
            .step(self.surface.children_mut().as_mut_slice(), dt);

        for event in self.scheduler.drain_completed() {
            let Some(particle) = self.surface.children_mut().get_mut(event.particle) else {
                continue;
            };
            trace!("particle {} settled, now {}", event.particle, event.next);
            particle.set_state(event.next);
            self.motion
                .settled(particle, &mut self.rng)
                .begin(&mut self.scheduler, particle);
        }
    }

    /// Compose the current state onto the surface.
    pub fn redraw(&mut self) {
        self.surface.redraw();
    }

    /// One full frame: advance then redraw.
    pub fn tick(&mut self, dt: Duration) {
        self.advance(dt);
        self.redraw();
    }

    /// Converge the selected particles on their formation origins.
    /// Returns how many particles were affected.
    pub fn trigger_form(&mut self, selection: impl Into<Selection>) -> usize {
        self.trigger(Trigger::Form, selection.into())
    }

    /// Scatter the selected particles back into free drift.
    /// Returns how many particles were affected.
    pub fn trigger_disperse(&mut self, selection: impl Into<Selection>) -> usize {
        self.trigger(Trigger::Disperse, selection.into())
    }

    fn trigger(&mut self, trigger: Trigger, selection: Selection) -> usize {
        match selection {
            Selection::All => {
                let mut affected = 0;
                for particle in self.surface.children_mut().iter_mut() {
                    self.motion
                        .triggered(trigger, particle, &mut self.rng)
                        .begin(&mut self.scheduler, particle);
                    affected += 1;
                }
                debug!("{trigger:?} triggered on all {affected} particles");
                affected
            }
            Selection::Particle(id) => match self.surface.children_mut().get_mut(id) {
                Some(particle) => {
                    self.motion
                        .triggered(trigger, particle, &mut self.rng)
                        .begin(&mut self.scheduler, particle);
                    debug!("{trigger:?} triggered on particle {id}");
                    1
                }
                None => {
                    debug!("ignoring {trigger:?} for unknown particle {id}");
                    0
                }
            },
        }
    }

    pub fn particles(&self) -> &ParticlePool {
        self.surface.children()
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.surface.children().get(id)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tuning(&self) -> &MotionTuning {
        self.motion.tuning()
    }

    /// Total time the tweens have been advanced.
    pub fn clock(&self) -> Duration {
        self.scheduler.clock()
    }

    /// Draw the latest surface frame into `area` of a terminal frame.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        self.surface.render(frame, area);
    }

    /// A render loop bound to this engine's render handle.
    pub fn render_loop(&self, fps: u32) -> RenderLoop {
        RenderLoop::new(fps, self.render.clone())
    }

    pub fn render_handle(&self) -> RenderHandle {
        self.render.clone()
    }

    /// Stop the render loop. Safe to call more than once.
    pub fn dispose(&mut self) {
        if !self.render.is_stopped() {
            self.render.stop();
            info!("engine `{}` disposed", self.surface.container());
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.render.is_stopped()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use bokeh_core::{Interval, Point};

    use super::*;
    use crate::motion::MotionState;

    const A: Rgb = Rgb::new(0xa1, 0xbd, 0xff);
    const B: Rgb = Rgb::new(0x36, 0x5f, 0xa9);
    const C: Rgb = Rgb::new(0x73, 0x91, 0xb0);
    const VIEWPORT: Viewport = Viewport::new(800.0, 200.0);
    const FRAME: Duration = Duration::from_millis(16);

    fn engine(count: usize, seed: u64) -> Engine {
        let params = EngineParams::new(VIEWPORT, vec![A, B, C])
            .with_particle_count(count)
            .with_seed(seed);
        Engine::new(params).expect("valid engine")
    }

    #[test]
    fn test_rejects_invalid_params() {
        let empty = EngineParams::new(VIEWPORT, vec![A]).with_particle_count(0);
        assert_eq!(Engine::new(empty).err(), Some(EngineError::NoParticles));

        let colorless = EngineParams::new(VIEWPORT, Vec::new());
        assert_eq!(Engine::new(colorless).err(), Some(EngineError::EmptyPalette));
    }

    #[test]
    fn test_initial_scenario() {
        let engine = engine(3, 1);
        let particles: Vec<&Particle> = engine.particles().iter().collect();

        assert_eq!(particles.len(), 3);
        assert_eq!(
            particles.iter().map(|p| p.color()).collect::<Vec<_>>(),
            vec![A, B, C]
        );
        for particle in particles {
            assert_eq!(particle.state(), MotionState::Floating);
            assert!(VIEWPORT.contains(particle.position()));
            assert!((0.05..0.35).contains(&particle.alpha()));
            // The first drift leg is already running
            assert!(particle.has_active_tween());
        }
    }

    #[test]
    fn test_untriggered_particles_float_forever() {
        let tuning = MotionTuning {
            float_duration: Interval::new(0.05, 0.2),
            ..MotionTuning::default()
        };
        let params = EngineParams::new(VIEWPORT, vec![A])
            .with_particle_count(10)
            .with_seed(3)
            .with_tuning(tuning);
        let mut engine = Engine::new(params).expect("valid engine");

        for _ in 0..500 {
            engine.advance(FRAME);
            for particle in engine.particles().iter() {
                assert_eq!(particle.state(), MotionState::Floating);
                assert!(particle.has_active_tween());
            }
        }
    }

    #[test]
    fn test_form_on_floating_particle() {
        let mut engine = engine(5, 2);
        let id = ParticleId(2);
        assert_eq!(engine.trigger_form(id), 1);
        assert_eq!(engine.particle(id).map(Particle::state), Some(MotionState::Forming));

        let form = engine.tuning().form_duration();
        engine.advance(form);

        let particle = engine.particle(id).expect("particle exists");
        assert_eq!(particle.state(), MotionState::Jiggling);
        assert_eq!(particle.radius(), 5.0);
        assert_eq!(particle.scale(), (0.4, 0.4));
        assert_eq!(particle.alpha(), 1.0);
        assert_eq!(particle.position(), particle.origin());

        // Nobody else moved into formation
        for other in engine.particles().iter().filter(|p| p.id() != id) {
            assert_eq!(other.state(), MotionState::Floating);
        }
    }

    #[test]
    fn test_jiggle_keeps_near_origin() {
        let mut engine = engine(5, 4);
        engine.trigger_form(Selection::All);
        engine.advance(engine.tuning().form_duration());

        for _ in 0..100 {
            engine.advance(FRAME);
            for particle in engine.particles().iter() {
                assert_eq!(particle.state(), MotionState::Jiggling);
                let Point { x, y } = particle.position();
                let origin = particle.origin();
                assert!((origin.x..=origin.x + 3.0).contains(&x));
                assert!((origin.y..=origin.y + 3.0).contains(&y));
            }
        }
    }

    #[test]
    fn test_disperse_on_jiggling_particles() {
        let mut engine = engine(20, 5);
        assert_eq!(engine.trigger_form(Selection::All), 20);
        engine.advance(engine.tuning().form_duration());
        engine.advance(FRAME);
        assert!(
            engine
                .particles()
                .iter()
                .all(|p| p.state() == MotionState::Jiggling)
        );

        assert_eq!(engine.trigger_disperse(Selection::All), 20);
        assert!(
            engine
                .particles()
                .iter()
                .all(|p| p.state() == MotionState::Dispersing)
        );

        engine.advance(engine.tuning().disperse_duration());
        for particle in engine.particles().iter() {
            assert_eq!(particle.state(), MotionState::Floating);
            assert_eq!(particle.scale(), (1.0, 1.0));
            assert!(VIEWPORT.contains(particle.position()));
            assert!(Interval::new(0.1, 0.6).contains(particle.alpha()));
        }
    }

    #[test]
    fn test_disperse_preempts_form() {
        let mut engine = engine(3, 6);
        let id = ParticleId(1);
        engine.trigger_form(id);
        engine.advance(Duration::from_millis(100));

        let preempted = *engine.particle(id).expect("particle").attributes();
        engine.trigger_disperse(id);

        let particle = engine.particle(id).expect("particle");
        assert_eq!(particle.state(), MotionState::Dispersing);
        let start = *particle.tween().expect("disperse running").start();
        assert_eq!(start, preempted);

        for _ in 0..100 {
            engine.advance(Duration::from_millis(10));
            let state = engine.particle(id).map(Particle::state);
            assert_ne!(state, Some(MotionState::Jiggling));
        }
        assert_eq!(
            engine.particle(id).map(Particle::state),
            Some(MotionState::Floating)
        );
    }

    #[test]
    fn test_trigger_restarts_running_transition() {
        let mut engine = engine(1, 8);
        let id = ParticleId(0);
        engine.trigger_form(id);
        engine.advance(Duration::from_millis(300));
        engine.trigger_form(id);

        let tween = engine.particle(id).and_then(Particle::tween).expect("tween");
        assert_eq!(tween.elapsed(), Duration::ZERO);
        assert_eq!(engine.particle(id).map(Particle::state), Some(MotionState::Forming));
    }

    #[test]
    fn test_unknown_particle_is_ignored() {
        let mut engine = engine(3, 9);
        let before: Vec<_> = engine
            .particles()
            .iter()
            .map(|p| (p.state(), *p.attributes(), p.tween().map(|t| *t.target())))
            .collect();

        assert_eq!(engine.trigger_form(ParticleId(3)), 0);
        assert_eq!(engine.trigger_disperse(ParticleId(99)), 0);

        let after: Vec<_> = engine
            .particles()
            .iter()
            .map(|p| (p.state(), *p.attributes(), p.tween().map(|t| *t.target())))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_engines_are_independent() {
        let mut first = engine(4, 10);
        let second = engine(4, 10);

        first.trigger_form(Selection::All);
        first.advance(Duration::from_secs(1));

        assert!(
            second
                .particles()
                .iter()
                .all(|p| p.state() == MotionState::Floating)
        );
        assert_eq!(second.clock(), Duration::ZERO);
    }

    #[test]
    fn test_tick_redraws_after_advancing() {
        let mut engine = engine(2, 11);
        engine.tick(FRAME);
        engine.tick(FRAME);
        assert_eq!(engine.surface().redraws(), 2);
        assert_eq!(engine.clock(), FRAME * 2);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut engine = engine(1, 12);
        let handle = engine.render_handle();
        assert!(!engine.is_disposed());
        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_oversized_durations_never_finish() {
        let tuning = MotionTuning {
            float_duration: Interval::fixed(1e30),
            form_duration: 1e30,
            ..MotionTuning::default()
        };
        let params = EngineParams::new(VIEWPORT, vec![A])
            .with_particle_count(2)
            .with_seed(4)
            .with_tuning(tuning);
        let mut engine = Engine::new(params).expect("valid engine");

        engine.tick(FRAME);
        assert_eq!(engine.trigger_form(Selection::All), 2);
        engine.tick(FRAME);
        for particle in engine.particles().iter() {
            assert_eq!(particle.state(), MotionState::Forming);
            assert!(particle.has_active_tween());
        }
    }

    #[test]
    fn test_surface_follows_params() {
        let mut params = EngineParams::new(VIEWPORT, vec![A]).with_seed(1);
        params.container = "hero".to_string();
        params.surface_height = Some(120.0);
        let engine = Engine::new(params).expect("valid engine");
        assert_eq!(engine.surface().container(), "hero");
        assert_eq!(engine.surface().size(), (1600.0, 120.0));
        assert_eq!(engine.particles().len(), DEFAULT_PARTICLE_COUNT);
    }
}
