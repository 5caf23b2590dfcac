//! Field configuration.
//!
//! All tunables have fixed defaults; a config can also be loaded from JSON:
//!
//! ```json
//! { "point_count": 180, "edge_threshold": 0.42, "reshape": { "enabled": true } }
//! ```
//!
//! Missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// How the curve parameter `t` is chosen for each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Golden-angle steps from a seeded phase. Even coverage without clumps.
    ///
    /// Point `i` sits at `t = (phase + i * golden_angle) mod 2π`, where
    /// `phase` is the first draw of the seed sequence scaled to `[0, 2π)`.
    #[default]
    GoldenAngle,
    /// Independent uniform draws in `[0, 2π)`.
    Uniform,
}

/// Global "breathing" scale: `1 + a₀·sin(e·f₀) + a₁·sin(e·f₁ + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub amplitudes: [f32; 2],
    pub frequencies: [f32; 2],
    pub phase: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            amplitudes: [0.06, 0.03],
            frequencies: [2.2, 4.6],
            phase: 1.2,
        }
    }
}

/// Periodic regeneration of the point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeConfig {
    pub enabled: bool,
    /// Seconds between reshapes.
    pub interval_secs: f32,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 6.0,
        }
    }
}

/// Colours and sizes used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// sRGB colour of points and lines, channels in `0..=1` as in a CSS hex
    /// colour. Decoded to linear before it reaches an sRGB surface.
    pub color: [f32; 3],
    /// Point diameter in world units (shrinks with distance).
    pub point_size: f32,
    pub line_opacity: f32,
    /// Clear colour, sRGB with straight alpha.
    pub background: [f32; 4],
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            // #ff2d3f
            color: [1.0, 45.0 / 255.0, 63.0 / 255.0],
            point_size: 0.075,
            line_opacity: 0.36,
            background: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Complete configuration of a heart field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of points. Fixed for the lifetime of a mounted field.
    pub point_count: u32,
    /// Starting seed of the point generator.
    pub seed: u32,
    pub sampling: Sampling,
    /// Multiplier taking raw curve units (x ∈ [-16, 16]) to scene units.
    pub shape_scale: f32,
    /// Half-width of the z band, in raw curve units.
    pub depth: f32,
    /// Maximum random x/y offset per point, in scene units.
    pub position_jitter: f32,
    /// Range of the per-point oscillation amplitude.
    pub jitter_amplitude: [f32; 2],
    /// Points closer than this (base positions) are joined by a line.
    pub edge_threshold: f32,
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Slowly orbit the camera and offset it with the pointer.
    pub camera_orbit: bool,
    pub repel_radius: f32,
    pub repel_strength: f32,
    /// Fraction of the remaining distance to the target covered each frame.
    pub morph_rate: f32,
    /// Fraction of the remaining rotation covered each frame.
    pub rotation_follow: f32,
    pub pulse: PulseConfig,
    /// Travelling beat wave across the shape.
    pub heartbeat_wave: bool,
    pub reshape: ReshapeConfig,
    pub visuals: VisualConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            point_count: 300,
            seed: 2026,
            sampling: Sampling::GoldenAngle,
            shape_scale: 0.085,
            depth: 1.6,
            position_jitter: 0.035,
            jitter_amplitude: [0.002, 0.008],
            edge_threshold: 0.38,
            camera_distance: 3.4,
            field_of_view: 55.0,
            camera_orbit: false,
            repel_radius: 0.45,
            repel_strength: 0.12,
            morph_rate: 0.06,
            rotation_follow: 0.05,
            pulse: PulseConfig::default(),
            heartbeat_wave: true,
            reshape: ReshapeConfig::default(),
            visuals: VisualConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl FieldConfig {
    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the generator and the motion step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_count == 0 {
            return Err(invalid("point_count", "must be at least 1"));
        }
        if !(self.edge_threshold > 0.0) {
            return Err(invalid("edge_threshold", "must be positive"));
        }
        if !(self.camera_distance > 0.0) {
            return Err(invalid("camera_distance", "must be positive"));
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(invalid("field_of_view", "must be between 0 and 180 degrees"));
        }
        if !(self.morph_rate > 0.0 && self.morph_rate <= 1.0) {
            return Err(invalid("morph_rate", "must be in (0, 1]"));
        }
        if !(self.rotation_follow > 0.0 && self.rotation_follow <= 1.0) {
            return Err(invalid("rotation_follow", "must be in (0, 1]"));
        }
        if !(self.repel_radius >= 0.0) {
            return Err(invalid("repel_radius", "must not be negative"));
        }
        if !(self.repel_strength >= 0.0) {
            return Err(invalid("repel_strength", "must not be negative"));
        }
        let [lo, hi] = self.jitter_amplitude;
        if !(lo >= 0.0 && lo <= hi) {
            return Err(invalid(
                "jitter_amplitude",
                format!("expected 0 <= min <= max, got [{}, {}]", lo, hi),
            ));
        }
        if self.reshape.enabled && !(self.reshape.interval_secs > 0.0) {
            return Err(invalid("reshape.interval_secs", "must be positive"));
        }
        Ok(())
    }
}
