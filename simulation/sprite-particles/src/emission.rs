//! Random draws taken when a particle is emitted

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{EmitterConfig, ValueRange};

/// Random number source for emission
#[derive(Debug, Clone)]
pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    /// Create a deterministic RNG from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from the operating system
    pub fn from_os() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Uniform value in the closed interval between `a` and `b`
    ///
    /// The bounds may be given in either order. Non-finite bounds yield `a`.
    pub fn between(&mut self, a: f32, b: f32) -> f32 {
        if !(a.is_finite() && b.is_finite()) || a == b {
            return a;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let t: f32 = self.inner.random_range(0.0..=1.0);
        // Lerp form stays finite even when `hi - lo` overflows
        (lo * (1.0 - t) + hi * t).clamp(lo, hi)
    }

    /// Uniform value within a configured range
    #[inline]
    pub fn in_range(&mut self, range: ValueRange) -> f32 {
        self.between(range.min, range.max)
    }
}

/// Kinematics drawn for one emitted particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionSample {
    /// Initial velocity in units per second
    pub velocity: Vec2,
    /// Fixed initial rotation in radians
    pub rotation: f32,
}

impl EmissionSample {
    /// Draw direction, speed and rotation from the configured ranges
    ///
    /// A single speed is decomposed along the drawn direction.
    pub fn draw(config: &EmitterConfig, rng: &mut ParticleRng) -> Self {
        let angle = rng.in_range(config.emit_angle).to_radians();
        let speed = rng.in_range(config.speed);
        let rotation = rng.in_range(config.particle_angle).to_radians();

        Self {
            velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            rotation,
        }
    }
}
