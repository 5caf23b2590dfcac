//! Per-frame motion of the point field.
//!
//! Each frame, for every point:
//!
//! 1. morph toward the target (exponential approach)
//! 2. heartbeat wave, if enabled
//! 3. per-axis jitter oscillation
//! 4. pointer repulsion in the x/y plane
//!
//! The sum is written to the live buffer. Pulse scale and pointer-follow
//! rotation are applied to the whole group, not per point.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::config::{FieldConfig, PulseConfig};
use crate::field::PointField;
use crate::shape::JitterProfile;

/// Oscillation frequency of each jitter axis. Distinct so axes don't move in
/// lockstep.
pub const JITTER_FREQUENCY: Vec3 = Vec3::new(1.2, 1.4, 1.6);

/// Added to the pointer distance before normalizing the push direction.
const REPEL_EPSILON: f32 = 1e-4;

/// Group tilt per unit of pointer NDC: (around x from vertical, around y from horizontal).
const TILT: Vec2 = Vec2::new(0.35, 0.55);

/// Jitter displacement of one point at `elapsed` seconds.
#[inline]
pub fn jitter_offset(profile: &JitterProfile, elapsed: f32) -> Vec3 {
    let phase = JITTER_FREQUENCY * elapsed + profile.phase;
    Vec3::new(phase.x.sin(), phase.y.cos(), phase.z.sin()) * profile.amplitude
}

/// Push of the pointer on a point, both in the x/y plane.
///
/// `(1 - d / radius)² · strength` along the pointer→point direction; zero at
/// and beyond `radius`, at most `strength` anywhere, finite when the point
/// sits exactly on the pointer.
#[inline]
pub fn repulsion(point: Vec2, pointer: Vec2, radius: f32, strength: f32) -> Vec2 {
    let delta = point - pointer;
    let distance = delta.length();
    if !(radius > 0.0) || distance >= radius {
        return Vec2::ZERO;
    }
    let falloff = 1.0 - distance / radius;
    delta / (distance + REPEL_EPSILON) * (falloff * falloff * strength)
}

/// Uniform group scale at `elapsed` seconds.
#[inline]
pub fn pulse_scale(pulse: &PulseConfig, elapsed: f32) -> f32 {
    let [a0, a1] = pulse.amplitudes;
    let [f0, f1] = pulse.frequencies;
    1.0 + a0 * (elapsed * f0).sin() + a1 * (elapsed * f1 + pulse.phase).sin()
}

/// The range [`pulse_scale`] can take for a pulse.
pub fn pulse_bounds(pulse: &PulseConfig) -> (f32, f32) {
    let swing = pulse.amplitudes[0].abs() + pulse.amplitudes[1].abs();
    (1.0 - swing, 1.0 + swing)
}

/// Strength of the heartbeat wave at `elapsed`: a squared half-wave kick.
#[inline]
pub fn heartbeat_strength(elapsed: f32) -> f32 {
    let kick = (elapsed * 2.8).sin().max(0.0);
    kick * kick * 0.22
}

/// Displace a point by the heartbeat wave travelling up the shape.
#[inline]
pub fn heartbeat_offset(position: Vec3, base_y: f32, strength: f32, elapsed: f32) -> Vec3 {
    let wave = strength * (elapsed * 6.2 + base_y * 5.2).sin();
    Vec3::new(
        position.x * (1.0 + wave * 0.08),
        position.y * (1.0 + wave * 0.12),
        position.z + wave * 0.6,
    )
}

/// Rotation the group leans toward for a pointer position (y-up NDC).
#[inline]
pub fn rotation_target(pointer_ndc: Vec2) -> Vec2 {
    Vec2::new(-pointer_ndc.y * TILT.x, pointer_ndc.x * TILT.y)
}

/// Scale and tilt applied to the whole point group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTransform {
    pub scale: f32,
    /// Rotation around x and y, radians.
    pub rotation: Vec2,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: Vec2::ZERO,
        }
    }
}

impl GroupTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0),
            Vec3::ZERO,
        )
    }

    /// Map a world-space position into the group's local space.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        if self.scale.abs() < f32::EPSILON {
            return Vec3::ZERO;
        }
        self.matrix().inverse().transform_point3(world)
    }

    /// Move the rotation a fraction `rate` of the way toward `target`.
    pub fn follow(&mut self, target: Vec2, rate: f32) {
        self.rotation = self.rotation.lerp(target, rate);
    }
}

/// What the motion step knows about the pointer this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    /// Normalized device coordinates, y up.
    pub ndc: Vec2,
    /// Pointer projected onto the z = 0 plane, if it has been resolved.
    pub world: Option<Vec3>,
}

/// Constants of the motion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub morph_rate: f32,
    pub rotation_follow: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    pub pulse: PulseConfig,
    pub heartbeat_wave: bool,
}

impl MotionParams {
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            morph_rate: config.morph_rate,
            rotation_follow: config.rotation_follow,
            repel_radius: config.repel_radius,
            repel_strength: config.repel_strength,
            pulse: config.pulse,
            heartbeat_wave: config.heartbeat_wave,
        }
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

/// Runs the per-frame update and owns the group transform.
#[derive(Debug, Clone)]
pub struct MotionController {
    params: MotionParams,
    group: GroupTransform,
}

impl MotionController {
    pub fn new(params: MotionParams) -> Self {
        Self {
            params,
            group: GroupTransform::default(),
        }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Group transform produced by the last [`step`](Self::step).
    pub fn group(&self) -> GroupTransform {
        self.group
    }

    /// Advance the field to `elapsed` seconds and rewrite its live buffer.
    pub fn step(&mut self, field: &mut PointField, elapsed: f32, pointer: PointerSample) {
        let params = self.params;

        self.group.scale = pulse_scale(&params.pulse, elapsed);
        self.group
            .follow(rotation_target(pointer.ndc), params.rotation_follow);

        let pointer_local = pointer
            .world
            .map(|world| self.group.to_local(world).truncate());
        let wave = if params.heartbeat_wave {
            heartbeat_strength(elapsed)
        } else {
            0.0
        };

        for i in 0..field.len() {
            let morphed = field.morph[i].lerp(field.target[i], params.morph_rate);
            field.morph[i] = morphed;

            let mut position = if wave > 0.0 {
                heartbeat_offset(morphed, field.base[i].y, wave, elapsed)
            } else {
                morphed
            };
            position += jitter_offset(&field.jitter[i], elapsed);

            if let Some(pointer) = pointer_local {
                let push = repulsion(
                    morphed.truncate(),
                    pointer,
                    params.repel_radius,
                    params.repel_strength,
                );
                position += push.extend(0.0);
            }

            field.write_live(i, position);
        }
    }
}
