//! Individual particle representation

use glam::Vec2;

/// Default lifespan in seconds for a freshly constructed particle
pub const DEFAULT_LIFE: f32 = 1.0;

/// Mask selecting the color channels of a packed `0xAARRGGBB` value
pub const TINT_MASK: u32 = 0x00FF_FFFF;

/// Bit offset of the alpha byte in a packed color
const ALPHA_SHIFT: u32 = 24;

/// Scale and alpha captured at one end of a particle's life
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleEndpoint {
    /// Uniform scale
    pub scale: f32,
    /// Opacity (0.0-1.0)
    pub alpha: f32,
}

impl Default for ParticleEndpoint {
    fn default() -> Self {
        Self {
            scale: 1.0,
            alpha: 1.0,
        }
    }
}

/// A single particle in the system
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle {
    /// World-space X position
    pub x: f32,
    /// World-space Y position
    pub y: f32,
    /// Horizontal velocity in units per second
    pub velocity_x: f32,
    /// Vertical velocity in units per second
    pub velocity_y: f32,
    /// Rotation in radians
    pub rotation: f32,
    /// Angular velocity in radians per second
    pub angular_velocity: f32,
    /// Visual state at emission
    pub start: ParticleEndpoint,
    /// Visual state at expiry
    pub end: ParticleEndpoint,
    /// Current horizontal scale
    pub scale_x: f32,
    /// Current vertical scale
    pub scale_y: f32,
    /// Packed `0xAARRGGBB` color; the top byte is the current alpha
    pub color: u32,
    /// Total lifespan in seconds, always positive once emitted
    pub life: f32,
    /// Remaining lifespan in seconds
    pub life_step: f32,
    /// Remaining fraction of life as of the last update
    pub norm_life_step: f32,
    /// Sort key restoring emission order after compaction
    pub index: usize,
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Particle {
    /// Create a new particle at the given position
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            velocity_x: 0.0,
            velocity_y: 0.0,
            rotation: 0.0,
            angular_velocity: 0.0,
            start: ParticleEndpoint::default(),
            end: ParticleEndpoint::default(),
            scale_x: 1.0,
            scale_y: 1.0,
            color: 0xFFFF_FFFF,
            life: DEFAULT_LIFE,
            life_step: DEFAULT_LIFE,
            norm_life_step: 1.0,
            index: 0,
        }
    }

    /// Reinitialize a pooled particle in place
    ///
    /// Leaves the particle indistinguishable from `Particle::new(x, y)`.
    pub fn reset(&mut self, x: f32, y: f32) {
        *self = Self::new(x, y);
    }

    /// Position as a vector
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Velocity as a vector
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.velocity_x, self.velocity_y)
    }

    /// Current scale as a vector
    #[inline]
    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.scale_x, self.scale_y)
    }

    /// Elapsed fraction of life (0.0 to 1.0) as of the last update
    #[inline]
    pub fn age_percent(&self) -> f32 {
        (1.0 - self.norm_life_step).clamp(0.0, 1.0)
    }

    /// Current alpha decoded from the packed color
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.color >> ALPHA_SHIFT) as f32 / 255.0
    }

    /// Encode `alpha` into the top byte of the packed color
    ///
    /// Values outside 0.0-1.0 saturate. The color channels are preserved.
    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.color = pack_alpha(self.color, alpha);
    }

    /// Color channels of the packed color (`0x00RRGGBB`)
    #[inline]
    pub fn tint(&self) -> u32 {
        self.color & TINT_MASK
    }

    /// Replace the color channels, keeping the current alpha
    #[inline]
    pub fn set_tint(&mut self, rgb: u32) {
        self.color = (self.color & !TINT_MASK) | (rgb & TINT_MASK);
    }

    /// Advance position, velocity and rotation by one step
    ///
    /// `gravity_step` is the velocity change for this step (gravity already
    /// multiplied by `dt`).
    #[inline]
    pub(crate) fn integrate(&mut self, dt: f32, gravity_step: Vec2) {
        self.velocity_x += gravity_step.x;
        self.velocity_y += gravity_step.y;
        self.x += self.velocity_x * dt;
        self.y += self.velocity_y * dt;
        self.rotation += self.angular_velocity * dt;
    }

    /// Interpolate scale and alpha from the remaining life
    ///
    /// Uses `life_step` before the current step's decrement.
    #[inline]
    pub(crate) fn interpolate(&mut self) {
        self.norm_life_step = self.life_step / self.life;
        let norm = 1.0 - self.norm_life_step;

        let alpha = (self.end.alpha - self.start.alpha) * norm + self.start.alpha;
        let scale = (self.end.scale - self.start.scale) * norm + self.start.scale;

        self.scale_x = scale;
        self.scale_y = scale;
        self.set_alpha(alpha);
    }
}

/// Pack `alpha` as `round(alpha * 255)` into the top byte of `color`
#[inline]
pub fn pack_alpha(color: u32, alpha: f32) -> u32 {
    // NaN saturates to 0 through the float-to-int cast
    let byte = (alpha * 255.0).round().clamp(0.0, 255.0) as u32;
    (color & TINT_MASK) | (byte << ALPHA_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_particle_new() {
        let p = Particle::new(3.0, -4.0);
        assert_eq!(p.position(), Vec2::new(3.0, -4.0));
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.rotation, 0.0);
        assert_eq!(p.angular_velocity, 0.0);
        assert_eq!(p.life, DEFAULT_LIFE);
        assert_eq!(p.life_step, DEFAULT_LIFE);
        assert_eq!(p.color, 0xFFFF_FFFF);
        assert_eq!(p.index, 0);
    }

    #[test]
    fn test_particle_reset_clears_previous_life() {
        let mut p = Particle::new(0.0, 0.0);
        p.velocity_x = 12.0;
        p.velocity_y = -3.0;
        p.rotation = 1.5;
        p.angular_velocity = 2.0;
        p.life = 4.0;
        p.life_step = -0.25;
        p.norm_life_step = -0.0625;
        p.color = 0x1234_5678;
        p.index = 9;
        p.start.scale = 0.1;
        p.end.alpha = 0.0;

        p.reset(7.0, 8.0);

        assert_eq!(p, Particle::new(7.0, 8.0));
    }

    #[test_case(1.0, 0xFF ; "opaque")]
    #[test_case(0.0, 0x00 ; "transparent")]
    #[test_case(0.5, 0x80 ; "half rounds up")]
    #[test_case(2.0, 0xFF ; "saturates high")]
    #[test_case(-1.0, 0x00 ; "saturates low")]
    fn test_pack_alpha(alpha: f32, expected: u32) {
        let packed = pack_alpha(0x00AB_CDEF, alpha);
        assert_eq!(packed >> 24, expected);
        assert_eq!(packed & TINT_MASK, 0x00AB_CDEF);
    }

    #[test]
    fn test_tint_preserves_alpha() {
        let mut p = Particle::new(0.0, 0.0);
        p.set_alpha(0.25);
        p.set_tint(0x00FF_8000);
        assert_eq!(p.tint(), 0x00FF_8000);
        assert_eq!(p.color >> 24, 64);
    }

    #[test]
    fn test_particle_integrate() {
        let mut p = Particle::new(0.0, 0.0);
        p.velocity_x = 1.0;
        p.angular_velocity = 2.0;

        // Half a second of downward gravity at 10 units/s^2
        p.integrate(0.5, Vec2::new(0.0, 5.0));

        assert!((p.velocity_y - 5.0).abs() < 1e-6);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 2.5).abs() < 1e-6);
        assert!((p.rotation - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_particle_interpolate_bounds() {
        let mut p = Particle::new(0.0, 0.0);
        p.start = ParticleEndpoint {
            scale: 1.0,
            alpha: 1.0,
        };
        p.end = ParticleEndpoint {
            scale: 3.0,
            alpha: 0.0,
        };
        p.life = 2.0;

        p.life_step = 2.0;
        p.interpolate();
        assert_eq!(p.scale_x, 1.0);
        assert_eq!(p.color >> 24, 0xFF);

        p.life_step = 1.0;
        p.interpolate();
        assert!((p.scale_x - 2.0).abs() < 1e-6);
        assert_eq!(p.scale_x, p.scale_y);
        assert_eq!(p.color >> 24, 0x80);
        assert!((p.age_percent() - 0.5).abs() < 1e-6);

        p.life_step = 0.0;
        p.interpolate();
        assert!((p.scale_x - 3.0).abs() < 1e-6);
        assert_eq!(p.color >> 24, 0x00);
    }
}
