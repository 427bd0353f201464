//! Particle emitter runtime state

use std::fmt;

use glam::Vec2;

use crate::config::{EmitterConfig, ValueRange};
use crate::emission::{EmissionSample, ParticleRng};
use crate::particle::Particle;

/// Floats written per particle by [`ParticleEmitter::fill_sprite_data`]
///
/// - 0: x
/// - 1: y
/// - 2: rotation
/// - 3: scale x
/// - 4: scale y
/// - 5: packed color, bit-cast with `f32::from_bits`
pub const SPRITE_FLOATS_PER_PARTICLE: usize = 6;

/// Smallest lifespan an emitted particle can have
pub const MIN_LIFE: f32 = f32::from_bits(1);

/// Stable handle to a particle slot
///
/// A slot keeps its id while moving between the alive and dead pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(usize);

impl ParticleId {
    /// Position of the slot in the emitter's arena
    pub fn slot(self) -> usize {
        self.0
    }
}

type DeathCallback = Box<dyn FnMut(&Particle)>;

/// Runtime particle emitter
///
/// Particles live in an arena and are only ever moved between the `alive`
/// list (emission order) and the `dead` free list. The arena never shrinks.
pub struct ParticleEmitter {
    /// Emission parameters
    config: EmitterConfig,
    /// Every particle ever allocated
    particles: Vec<Particle>,
    /// Active slots in emission order
    alive: Vec<usize>,
    /// Reusable slots, unordered
    dead: Vec<usize>,
    /// Random number generator
    rng: ParticleRng,
    /// Invoked when a particle expires during `update`
    death_callback: Option<DeathCallback>,
}

impl fmt::Debug for ParticleEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleEmitter")
            .field("config", &self.config)
            .field("alive", &self.alive.len())
            .field("dead", &self.dead.len())
            .field("death_callback", &self.death_callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self::with_config(EmitterConfig::default())
    }
}

impl ParticleEmitter {
    /// Create an emitter at the given position with default parameters
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_config(EmitterConfig {
            position: Vec2::new(x, y),
            ..Default::default()
        })
    }

    /// Create an emitter from a configuration
    ///
    /// The RNG is seeded from `config.seed` when present.
    pub fn with_config(config: EmitterConfig) -> Self {
        let rng = config.seed.map_or_else(ParticleRng::from_os, ParticleRng::new);
        Self {
            config,
            particles: Vec::new(),
            alive: Vec::new(),
            dead: Vec::new(),
            rng,
            death_callback: None,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Mutable configuration, read at the next emission or update
    pub fn config_mut(&mut self) -> &mut EmitterConfig {
        &mut self.config
    }

    /// Restart the RNG from a seed
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
        self.rng = ParticleRng::new(seed);
    }

    /// Emission origin
    pub fn position(&self) -> Vec2 {
        self.config.position
    }

    /// Move the emission origin; live particles are not affected
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.config.position = Vec2::new(x, y);
    }

    /// Initial speed range in units per second
    pub fn set_speed(&mut self, min: f32, max: f32) {
        self.config.speed = ValueRange::new(min, max);
    }

    /// Emission direction range in degrees
    pub fn set_emit_angle(&mut self, min: f32, max: f32) {
        self.config.emit_angle = ValueRange::new(min, max);
    }

    /// Initial rotation range in degrees
    ///
    /// This is a fixed rotation per particle, not a spin. Spin comes from
    /// `Particle::angular_velocity`, which emission leaves at zero.
    pub fn set_angle(&mut self, min: f32, max: f32) {
        self.config.particle_angle = ValueRange::new(min, max);
    }

    /// Scale at emission (`start`) and at expiry (`end`)
    pub fn set_scale(&mut self, start: f32, end: f32) {
        self.config.scale = ValueRange::new(start, end);
    }

    /// Alpha at emission (`start`) and at expiry (`end`)
    pub fn set_alpha(&mut self, start: f32, end: f32) {
        self.config.alpha = ValueRange::new(start, end);
    }

    /// Constant acceleration in units per second squared
    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.config.gravity = Vec2::new(x, y);
    }

    /// Lifespan in seconds given to newly emitted particles
    pub fn set_life(&mut self, seconds: f32) {
        self.config.life = seconds;
    }

    /// Lifespan in seconds given to newly emitted particles
    pub fn life(&self) -> f32 {
        self.config.life
    }

    /// Pre-allocate `count` particles into the dead pool
    pub fn reserve(&mut self, count: usize) {
        let Vec2 { x, y } = self.config.position;
        let first = self.particles.len();

        self.particles.reserve(count);
        self.dead.reserve(count);
        self.alive.reserve(count);
        for slot in first..first + count {
            self.particles.push(Particle::new(x, y));
            self.dead.push(slot);
        }

        log::debug!(
            "Reserved {count} particles ({} total)",
            self.particle_count()
        );
    }

    /// Number of active particles
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of pooled particles available for reuse
    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }

    /// Total particles owned by the emitter
    pub fn particle_count(&self) -> usize {
        self.alive.len() + self.dead.len()
    }

    /// Install the callback run when a particle expires during `update`
    ///
    /// Replaces any previous callback. The callback runs inline and sees the
    /// particle's state from the tick it expired on.
    pub fn on_particle_death<F>(&mut self, callback: F)
    where
        F: FnMut(&Particle) + 'static,
    {
        self.death_callback = Some(Box::new(callback));
    }

    /// Remove the death callback
    pub fn clear_particle_death(&mut self) {
        self.death_callback = None;
    }

    /// Move every active particle into the dead pool
    ///
    /// The death callback is not invoked.
    pub fn kill_all(&mut self) {
        let count = self.alive.len();
        self.dead.extend(self.alive.drain(..).rev());
        if count > 0 {
            log::debug!("Killed {count} particles");
        }
    }

    /// Call `f` on every active particle in emission order
    pub fn for_each_alive<F: FnMut(&Particle)>(&self, mut f: F) {
        for &slot in &self.alive {
            f(&self.particles[slot]);
        }
    }

    /// Call `f` on every pooled particle
    pub fn for_each_dead<F: FnMut(&Particle)>(&self, mut f: F) {
        for &slot in &self.dead {
            f(&self.particles[slot]);
        }
    }

    /// Active particles in emission order
    pub fn iter_alive(&self) -> impl Iterator<Item = &Particle> {
        self.alive.iter().map(|&slot| &self.particles[slot])
    }

    /// Pooled particles
    pub fn iter_dead(&self) -> impl Iterator<Item = &Particle> {
        self.dead.iter().map(|&slot| &self.particles[slot])
    }

    /// Handles of active particles in emission order
    pub fn alive_ids(&self) -> impl Iterator<Item = ParticleId> {
        self.alive.iter().map(|&slot| ParticleId(slot))
    }

    /// Handles of pooled particles
    pub fn dead_ids(&self) -> impl Iterator<Item = ParticleId> {
        self.dead.iter().map(|&slot| ParticleId(slot))
    }

    /// Look up a particle by handle
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.0)
    }

    /// Look up a particle by handle for modification
    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id.0)
    }

    /// Activate one particle with freshly drawn parameters
    ///
    /// Reuses a pooled particle when one is available and only allocates
    /// when the dead pool is empty. The particle is appended to the end of
    /// the alive list.
    pub fn emit_particle(&mut self) -> &mut Particle {
        let sample = EmissionSample::draw(&self.config, &mut self.rng);
        let Vec2 { x, y } = self.config.position;

        let slot = match self.dead.pop() {
            Some(slot) => {
                self.particles[slot].reset(x, y);
                slot
            }
            None => {
                log::trace!("Dead pool empty, allocating particle {}", self.particles.len());
                self.particles.push(Particle::new(x, y));
                self.particles.len() - 1
            }
        };

        let config = &self.config;
        let index = self.alive.len();
        let particle = &mut self.particles[slot];

        particle.rotation = sample.rotation;
        particle.velocity_x = sample.velocity.x;
        particle.velocity_y = sample.velocity.y;
        particle.life = config.life.max(MIN_LIFE);
        particle.life_step = particle.life;
        particle.start.scale = config.scale.min;
        particle.end.scale = config.scale.max;
        particle.scale_x = config.scale.min;
        particle.scale_y = config.scale.min;
        particle.start.alpha = config.alpha.min;
        particle.end.alpha = config.alpha.max;
        particle.set_alpha(config.alpha.min);
        particle.index = index;

        self.alive.push(slot);
        particle
    }

    /// Emit `count` particles
    pub fn emit_particles(&mut self, count: usize) {
        for _ in 0..count {
            self.emit_particle();
        }
    }

    /// Advance the simulation by one frame
    ///
    /// # Arguments
    /// * `time` - Host clock in milliseconds, used for diagnostics only
    /// * `delta_ms` - Frame time in milliseconds
    ///
    /// A particle is retired on the first update that finds its remaining
    /// life at or below zero, which is the tick after the one that used it
    /// up. Survivors keep their emission order.
    pub fn update(&mut self, time: f64, delta_ms: f32) {
        let dt = delta_ms / 1000.0;
        let gravity_step = self.config.gravity * dt;
        let Self {
            particles,
            alive,
            dead,
            death_callback,
            ..
        } = self;

        // Expired slots are swapped behind `length`
        let mut length = alive.len();
        let mut i = 0;
        while i < length {
            let particle = &mut particles[alive[i]];

            particle.integrate(dt, gravity_step);
            particle.interpolate();

            if particle.life_step <= 0.0 {
                alive.swap(i, length - 1);
                length -= 1;
                if let Some(callback) = death_callback.as_mut() {
                    callback(&*particle);
                }
            } else {
                i += 1;
            }
            particle.life_step -= dt;
        }

        let retired = alive.len() - length;
        if retired == 0 {
            return;
        }

        dead.extend(alive.drain(length..));
        // Indices are unique, so an unstable sort restores emission order
        alive.sort_unstable_by_key(|&slot| particles[slot].index);
        for (index, &slot) in alive.iter().enumerate() {
            particles[slot].index = index;
        }

        log::trace!(
            "t={time:.1}ms: retired {retired} particles, {} alive",
            alive.len()
        );
    }

    /// Flatten active particles into sprite data for the renderer
    ///
    /// See [`SPRITE_FLOATS_PER_PARTICLE`] for the layout.
    pub fn fill_sprite_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.alive.len() * SPRITE_FLOATS_PER_PARTICLE);
        self.write_sprite_data(&mut data);
        data
    }

    /// Like [`fill_sprite_data`](Self::fill_sprite_data), reusing `out`
    pub fn write_sprite_data(&self, out: &mut Vec<f32>) {
        out.clear();
        for particle in self.iter_alive() {
            out.extend_from_slice(&[
                particle.x,
                particle.y,
                particle.rotation,
                particle.scale_x,
                particle.scale_y,
                f32::from_bits(particle.color),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn still_emitter() -> ParticleEmitter {
        let mut emitter = ParticleEmitter::new(10.0, 20.0);
        emitter.reseed(42);
        emitter
    }

    #[test]
    fn test_reserve_accumulates() {
        let mut emitter = still_emitter();
        emitter.reserve(3);
        emitter.reserve(2);

        assert_eq!(emitter.dead_count(), 5);
        assert_eq!(emitter.alive_count(), 0);
        assert_eq!(emitter.particle_count(), 5);
        emitter.for_each_dead(|p| assert_eq!(p.position(), Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_emit_reuses_dead_particle() {
        let mut emitter = still_emitter();
        emitter.reserve(1);
        let reserved = emitter.dead_ids().next();

        emitter.emit_particle();

        assert_eq!(emitter.dead_count(), 0);
        assert_eq!(emitter.particle_count(), 1);
        assert_eq!(emitter.alive_ids().next(), reserved);
    }

    #[test]
    fn test_emit_allocates_when_pool_empty() {
        let mut emitter = still_emitter();
        emitter.emit_particle();
        emitter.emit_particle();

        assert_eq!(emitter.alive_count(), 2);
        assert_eq!(emitter.dead_count(), 0);
    }

    #[test]
    fn test_emit_sets_up_particle() {
        let mut emitter = still_emitter();
        emitter.set_speed(10.0, 10.0);
        emitter.set_emit_angle(0.0, 0.0);
        emitter.set_angle(90.0, 90.0);
        emitter.set_scale(0.5, 2.0);
        emitter.set_alpha(0.2, 0.8);
        emitter.set_life(3.0);

        let particle = emitter.emit_particle().clone();

        assert_eq!(particle.position(), Vec2::new(10.0, 20.0));
        assert!((particle.velocity_x - 10.0).abs() < 1e-5);
        assert!(particle.velocity_y.abs() < 1e-5);
        assert!((particle.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(particle.angular_velocity, 0.0);
        assert_eq!(particle.life, 3.0);
        assert_eq!(particle.life_step, 3.0);
        assert_eq!(particle.start.scale, 0.5);
        assert_eq!(particle.end.scale, 2.0);
        assert_eq!(particle.scale_x, 0.5);
        assert_eq!(particle.scale_y, 0.5);
        assert_eq!(particle.start.alpha, 0.2);
        assert_eq!(particle.end.alpha, 0.8);
        assert_eq!(particle.color >> 24, 51);
        assert_eq!(particle.index, 0);
    }

    #[test]
    fn test_emit_reset_discards_previous_life() {
        let mut emitter = still_emitter();
        emitter.reserve(1);
        {
            let particle = emitter.emit_particle();
            particle.angular_velocity = 5.0;
            particle.set_tint(0x0012_3456);
        }
        emitter.kill_all();

        let particle = emitter.emit_particle();
        assert_eq!(particle.angular_velocity, 0.0);
        assert_eq!(particle.color, 0xFFFF_FFFF);
    }

    #[test]
    fn test_life_is_floored() {
        let mut emitter = still_emitter();
        emitter.set_life(-2.0);
        assert_eq!(emitter.emit_particle().life, MIN_LIFE);

        emitter.set_life(f32::NAN);
        assert_eq!(emitter.emit_particle().life, MIN_LIFE);
    }

    #[test]
    fn test_zero_life_retires_on_second_update() {
        let mut emitter = still_emitter();
        emitter.set_life(0.0);
        emitter.emit_particle();

        emitter.update(0.0, 16.0);
        assert_eq!(emitter.alive_count(), 1);

        emitter.update(16.0, 16.0);
        assert_eq!(emitter.alive_count(), 0);
        assert_eq!(emitter.dead_count(), 1);
    }

    #[test]
    fn test_kill_all_moves_everything_without_callback() {
        let mut emitter = still_emitter();
        let deaths = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&deaths);
        emitter.on_particle_death(move |_| *counter.borrow_mut() += 1);

        emitter.reserve(2);
        emitter.emit_particles(4);
        emitter.kill_all();

        assert_eq!(emitter.alive_count(), 0);
        assert_eq!(emitter.dead_count(), 4);
        assert_eq!(*deaths.borrow(), 0);
    }

    #[test]
    fn test_death_callback_sees_expiring_particle() {
        let mut emitter = still_emitter();
        emitter.set_gravity(0.0, 10.0);
        emitter.set_life(0.5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        emitter.on_particle_death(move |p| sink.borrow_mut().push((p.life_step, p.velocity_y)));

        emitter.emit_particle();
        emitter.update(0.0, 500.0);
        assert!(seen.borrow().is_empty());
        emitter.update(500.0, 500.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        // Remaining life before the final decrement, gravity from both ticks
        assert!(seen[0].0.abs() < 1e-6);
        assert!((seen[0].1 - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_replacing_and_clearing_callback() {
        let mut emitter = still_emitter();
        emitter.set_life(0.0);
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));
        let a = Rc::clone(&first);
        let b = Rc::clone(&second);
        emitter.on_particle_death(move |_| *a.borrow_mut() += 1);
        emitter.on_particle_death(move |_| *b.borrow_mut() += 1);

        emitter.emit_particle();
        emitter.update(0.0, 1.0);
        emitter.update(1.0, 1.0);
        assert_eq!((*first.borrow(), *second.borrow()), (0, 1));

        emitter.clear_particle_death();
        emitter.emit_particle();
        emitter.update(2.0, 1.0);
        emitter.update(3.0, 1.0);
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn test_survivors_keep_emission_order() {
        let mut emitter = still_emitter();
        // Alternate long and short lives
        for i in 0..6 {
            emitter.set_life(if i % 2 == 0 { 0.01 } else { 10.0 });
            emitter.emit_particle().x = i as f32;
        }

        emitter.update(0.0, 20.0);
        emitter.update(20.0, 20.0);

        let order: Vec<f32> = emitter.iter_alive().map(|p| p.x).collect();
        assert_eq!(order, vec![1.0, 3.0, 5.0]);
        let indices: Vec<usize> = emitter.iter_alive().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_new_emissions_sort_after_survivors() {
        let mut emitter = still_emitter();
        for i in 0..4 {
            emitter.set_life(if i < 2 { 0.01 } else { 10.0 });
            emitter.emit_particle().x = i as f32;
        }
        emitter.update(0.0, 20.0);
        emitter.update(20.0, 20.0);

        emitter.set_life(0.01);
        emitter.emit_particle().x = 4.0;
        emitter.set_life(10.0);
        emitter.emit_particle().x = 5.0;
        emitter.update(40.0, 20.0);
        emitter.update(60.0, 20.0);

        let order: Vec<f32> = emitter.iter_alive().map(|p| p.x).collect();
        assert_eq!(order, vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_fill_sprite_data() {
        let mut emitter = still_emitter();
        emitter.set_alpha(0.5, 0.5);
        emitter.emit_particle();
        emitter.emit_particle().set_tint(0x00FF_0000);

        let data = emitter.fill_sprite_data();
        assert_eq!(data.len(), 2 * SPRITE_FLOATS_PER_PARTICLE);
        assert_eq!(&data[..5], &[10.0, 20.0, 0.0, 1.0, 1.0]);
        assert_eq!(data[11].to_bits(), 0x80FF_0000);
    }

    #[test]
    fn test_seeded_emitters_match() {
        let config = EmitterConfig {
            speed: ValueRange::new(10.0, 50.0),
            emit_angle: ValueRange::new(0.0, 360.0),
            seed: Some(9),
            ..Default::default()
        };
        let mut a = ParticleEmitter::with_config(config.clone());
        let mut b = ParticleEmitter::with_config(config);
        a.emit_particles(8);
        b.emit_particles(8);
        assert_eq!(a.fill_sprite_data().len(), b.fill_sprite_data().len());
        assert!(a.iter_alive().eq(b.iter_alive()));
    }
}
