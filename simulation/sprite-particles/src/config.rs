//! Emitter configuration
//!
//! All values are stored verbatim. Ranges may be inverted and `life` may be
//! zero or negative; the emitter tolerates both (draws are taken from the
//! closed interval between the bounds, and life is floored at emission).

use glam::Vec2;

/// A pair of bounds used for random draws or start/end interpolation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    /// First bound (the start value for interpolated ranges)
    pub min: f32,
    /// Second bound (the end value for interpolated ranges)
    pub max: f32,
}

impl ValueRange {
    /// Create a range from two bounds in any order
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range whose bounds are both `value`
    pub const fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Whether `value` lies in the closed interval between the bounds
    pub fn contains(&self, value: f32) -> bool {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        (lo..=hi).contains(&value)
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Emission parameters owned by a [`ParticleEmitter`](crate::ParticleEmitter)
///
/// Changes take effect on the next emission (gravity on the next update).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct EmitterConfig {
    /// Emission origin (the host entity's position)
    pub position: Vec2,
    /// Initial speed in units per second
    pub speed: ValueRange,
    /// Emission direction in degrees
    pub emit_angle: ValueRange,
    /// Fixed initial rotation of each particle in degrees
    pub particle_angle: ValueRange,
    /// Start (`min`) and end (`max`) scale
    pub scale: ValueRange,
    /// Start (`min`) and end (`max`) alpha
    pub alpha: ValueRange,
    /// Acceleration in units per second squared
    pub gravity: Vec2,
    /// Lifespan in seconds
    pub life: f32,
    /// Seed for the emission RNG; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            speed: ValueRange::constant(0.0),
            emit_angle: ValueRange::constant(0.0),
            particle_angle: ValueRange::constant(0.0),
            scale: ValueRange::constant(1.0),
            alpha: ValueRange::constant(1.0),
            gravity: Vec2::ZERO,
            life: 1.0,
            seed: None,
        }
    }
}

impl EmitterConfig {
    /// Names of fields holding values that produce degenerate particles
    ///
    /// Non-finite numbers and a non-positive life are reported. Nothing here
    /// is rejected; the list only feeds diagnostics.
    pub fn degenerate_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.position.is_finite() {
            fields.push("position");
        }
        let ranges = [
            ("speed", &self.speed),
            ("emit_angle", &self.emit_angle),
            ("particle_angle", &self.particle_angle),
            ("scale", &self.scale),
            ("alpha", &self.alpha),
        ];
        for (name, range) in ranges {
            if !range.is_finite() {
                fields.push(name);
            }
        }
        if !self.gravity.is_finite() {
            fields.push("gravity");
        }
        if self.life.is_nan() || self.life <= 0.0 {
            fields.push("life");
        }
        fields
    }

    #[cfg_attr(not(feature = "serde-support"), allow(dead_code))]
    fn log_degenerate(&self) {
        for field in self.degenerate_fields() {
            log::warn!("Emitter config field `{field}` is degenerate; particles will still be emitted");
        }
    }
}

#[cfg(feature = "serde-support")]
mod io {
    use super::EmitterConfig;
    use crate::error::{EmitterError, Result};
    use std::path::Path;

    /// On-disk configuration format
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ConfigFormat {
        /// `.json`
        Json,
        /// `.yaml` / `.yml`
        Yaml,
    }

    impl ConfigFormat {
        /// Pick a format from a file extension
        pub fn from_path(path: &Path) -> Result<Self> {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            match ext.as_deref() {
                Some("json") => Ok(Self::Json),
                Some("yaml" | "yml") => Ok(Self::Yaml),
                _ => Err(EmitterError::UnsupportedFormat(path.display().to_string())),
            }
        }
    }

    impl EmitterConfig {
        /// Parse a JSON configuration; missing fields take their defaults
        pub fn from_json_str(text: &str) -> Result<Self> {
            let config: Self = serde_json::from_str(text)?;
            config.log_degenerate();
            Ok(config)
        }

        /// Parse a YAML configuration; missing fields take their defaults
        pub fn from_yaml_str(text: &str) -> Result<Self> {
            let config: Self = serde_yaml_ng::from_str(text)?;
            config.log_degenerate();
            Ok(config)
        }

        /// Load a configuration file, choosing the format by extension
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let format = ConfigFormat::from_path(path)?;
            let text = std::fs::read_to_string(path)?;
            log::debug!("Loading {format:?} emitter config from {}", path.display());
            match format {
                ConfigFormat::Json => Self::from_json_str(&text),
                ConfigFormat::Yaml => Self::from_yaml_str(&text),
            }
        }

        /// Serialize to pretty-printed JSON
        pub fn to_json_string(&self) -> Result<String> {
            Ok(serde_json::to_string_pretty(self)?)
        }

        /// Serialize to YAML
        pub fn to_yaml_string(&self) -> Result<String> {
            Ok(serde_yaml_ng::to_string(self)?)
        }
    }
}

#[cfg(feature = "serde-support")]
pub use io::ConfigFormat;
