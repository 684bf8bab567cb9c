//! The fixed set of particles created at startup.

use bokeh_core::{Formation, MotionTuning, Rgb, Viewport};
use rand::Rng;

use crate::error::EngineError;
use crate::particle::{Attributes, Particle, ParticleId};

/// Particles in creation order. Never grows or shrinks after spawning.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    /// Create `count` particles at random spots of the viewport.
    ///
    /// Colors cycle through `palette` by creation index, origins come from
    /// `formation`, and every particle starts `Floating` with no tween.
    pub fn spawn<R: Rng + ?Sized>(
        count: usize,
        palette: &[Rgb],
        formation: Formation,
        viewport: Viewport,
        tuning: &MotionTuning,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if count == 0 {
            return Err(EngineError::NoParticles);
        }
        if palette.is_empty() {
            return Err(EngineError::EmptyPalette);
        }

        let particles = (0..count)
            .map(|i| {
                let attributes = Attributes {
                    x: rng.random::<f32>() * viewport.width,
                    y: rng.random::<f32>() * viewport.height,
                    radius: tuning.base_radius,
                    scale_x: 1.0,
                    scale_y: 1.0,
                    alpha: tuning.initial_alpha.sample(rng),
                };
                Particle::new(
                    ParticleId(i),
                    palette[i % palette.len()],
                    formation.origin(i, count, viewport),
                    tuning.base_radius,
                    attributes,
                )
            })
            .collect();

        Ok(Self { particles })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.0)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id.0)
    }

    /// Particles in creation (and drawing) order.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use bokeh_core::Interval;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::motion::MotionState;

    const VIEWPORT: Viewport = Viewport::new(800.0, 200.0);

    fn palette() -> Vec<Rgb> {
        vec![
            Rgb::new(0xa1, 0xbd, 0xff),
            Rgb::new(0x36, 0x5f, 0xa9),
            Rgb::new(0x73, 0x91, 0xb0),
        ]
    }

    #[test]
    fn test_spawn_initial_attributes() {
        let mut rng = StdRng::seed_from_u64(42);
        let tuning = MotionTuning::default();
        let pool = ParticlePool::spawn(
            100,
            &palette(),
            Formation::Ring,
            VIEWPORT,
            &tuning,
            &mut rng,
        )
        .expect("valid pool");

        assert_eq!(pool.len(), 100);
        for (i, particle) in pool.iter().enumerate() {
            assert_eq!(particle.id(), ParticleId(i));
            assert_eq!(particle.state(), MotionState::Floating);
            assert!(!particle.has_active_tween());
            assert!(VIEWPORT.contains(particle.position()));
            assert!((0.05..0.35).contains(&particle.alpha()));
            assert_eq!(particle.radius(), 60.0);
            assert_eq!(particle.scale(), (1.0, 1.0));
            assert_eq!(particle.color(), palette()[i % 3]);
            assert_eq!(particle.origin(), Formation::Ring.origin(i, 100, VIEWPORT));
        }
    }

    #[test]
    fn test_spawn_rejects_empty_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        let tuning = MotionTuning::default();
        let no_particles =
            ParticlePool::spawn(0, &palette(), Formation::Ring, VIEWPORT, &tuning, &mut rng);
        assert_eq!(no_particles.err(), Some(EngineError::NoParticles));

        let no_colors = ParticlePool::spawn(3, &[], Formation::Ring, VIEWPORT, &tuning, &mut rng);
        assert_eq!(no_colors.err(), Some(EngineError::EmptyPalette));
    }

    #[test]
    fn test_fixed_initial_alpha() {
        let mut rng = StdRng::seed_from_u64(1);
        let tuning = MotionTuning {
            initial_alpha: Interval::fixed(0.2),
            ..MotionTuning::default()
        };
        let pool = ParticlePool::spawn(5, &palette(), Formation::Line, VIEWPORT, &tuning, &mut rng)
            .expect("valid pool");
        assert!(pool.iter().all(|p| p.alpha() == 0.2));
        assert!(pool.get(ParticleId(5)).is_none());
    }
}
