//! Fixed-budget particle emitter for 2D sprites
//!
//! This crate owns emission parameters, a pool of particles and the
//! per-frame simulation step. Drawing is left to the caller, which reads
//! position, rotation, scale and packed color from the alive particles.
//!
//! # Architecture
//!
//! - `Particle`: kinematic and interpolated visual state of one sprite
//! - `ParticleEmitter`: configuration plus the alive and dead pools
//! - `EmitterConfig`: speed, angle, scale, alpha, gravity and life settings
//!
//! Particles are allocated once and recycled. Emission pops from the dead
//! pool and only allocates when it is empty; expiry moves particles back.
//!
//! # Usage
//!
//! ```
//! use sprite_particles::ParticleEmitter;
//!
//! let mut emitter = ParticleEmitter::new(400.0, 300.0);
//! emitter.set_speed(50.0, 120.0);
//! emitter.set_emit_angle(-120.0, -60.0);
//! emitter.set_gravity(0.0, 98.0);
//! emitter.set_scale(1.0, 0.0);
//! emitter.set_alpha(1.0, 0.0);
//! emitter.reserve(64);
//!
//! for frame in 0..60 {
//!     emitter.emit_particle();
//!     emitter.update(f64::from(frame) * 16.0, 16.0);
//! }
//!
//! assert_eq!(emitter.particle_count(), 64);
//! let sprites = emitter.fill_sprite_data();
//! assert_eq!(sprites.len(), emitter.alive_count() * sprite_particles::SPRITE_FLOATS_PER_PARTICLE);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod emission;
pub mod emitter;
pub mod error;
pub mod particle;

pub use config::{EmitterConfig, ValueRange};
#[cfg(feature = "serde-support")]
pub use config::ConfigFormat;
pub use emission::{EmissionSample, ParticleRng};
pub use emitter::{MIN_LIFE, ParticleEmitter, ParticleId, SPRITE_FLOATS_PER_PARTICLE};
pub use error::{EmitterError, Result};
pub use particle::{Particle, ParticleEndpoint};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
