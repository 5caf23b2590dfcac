//! Point generation along the heart curve.
//!
//! ```text
//! x(t) = 16·sin³(t)
//! y(t) = 13·cos(t) − 5·cos(2t) − 2·cos(3t) − cos(4t)
//! ```
//!
//! Each point is the curve sample scaled into scene units, pushed into a z
//! band for depth and nudged by a small random x/y offset. Alongside every
//! point a [`JitterProfile`] is drawn from the same sequence.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

use crate::config::{FieldConfig, Sampling};
use crate::random::SeedSequence;

/// `π·(3 − √5)`, the golden angle in radians.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Evaluate the heart curve at parameter `t`, in raw curve units.
#[inline]
pub fn heart_curve(t: f32) -> Vec2 {
    let s = t.sin();
    Vec2::new(
        16.0 * s * s * s,
        13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos(),
    )
}

/// Per-point oscillation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterProfile {
    /// Phase of the x, y and z oscillators, each in `[0, 2π)`.
    pub phase: Vec3,
    pub amplitude: f32,
}

/// A generated point set and its jitter profiles, correlated by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub points: Vec<Vec3>,
    pub jitter: Vec<JitterProfile>,
}

impl Shape {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Builds [`Shape`]s from a seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointGenerator {
    pub sampling: Sampling,
    pub scale: f32,
    pub depth: f32,
    pub position_jitter: f32,
    pub jitter_amplitude: [f32; 2],
}

impl Default for PointGenerator {
    fn default() -> Self {
        Self::from_config(&FieldConfig::default())
    }
}

impl PointGenerator {
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            sampling: config.sampling,
            scale: config.shape_scale,
            depth: config.depth,
            position_jitter: config.position_jitter,
            jitter_amplitude: config.jitter_amplitude,
        }
    }

    /// Generate `count` points starting from `seed`.
    ///
    /// Pure in `(self, count, seed)`.
    pub fn generate(&self, count: usize, seed: u32) -> Shape {
        let mut seq = SeedSequence::new(seed);
        let mut points = Vec::with_capacity(count);
        let mut jitter = Vec::with_capacity(count);

        let phase = match self.sampling {
            Sampling::GoldenAngle => seq.next_range(0.0, TAU),
            Sampling::Uniform => 0.0,
        };
        let j = self.position_jitter;
        let [amp_min, amp_max] = self.jitter_amplitude;

        for i in 0..count {
            let t = match self.sampling {
                Sampling::GoldenAngle => (phase + i as f32 * GOLDEN_ANGLE).rem_euclid(TAU),
                Sampling::Uniform => seq.next_range(0.0, TAU),
            };
            let curve = heart_curve(t);
            let z = seq.next_range(-self.depth, self.depth);
            let offset = Vec3::new(seq.next_range(-j, j), seq.next_range(-j, j), 0.0);

            points.push(curve.extend(z) * self.scale + offset);
            jitter.push(JitterProfile {
                phase: Vec3::new(
                    seq.next_range(0.0, TAU),
                    seq.next_range(0.0, TAU),
                    seq.next_range(0.0, TAU),
                ),
                amplitude: seq.next_range(amp_min, amp_max),
            });
        }

        Shape { points, jitter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_angle_constant() {
        let expected = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        assert!((GOLDEN_ANGLE - expected).abs() < 1e-6);
    }

    #[test]
    fn test_heart_curve_landmarks() {
        // Top cusp and bottom tip.
        let top = heart_curve(0.0);
        assert!(top.x.abs() < 1e-5);
        assert!((top.y - 5.0).abs() < 1e-5);

        let tip = heart_curve(std::f32::consts::PI);
        assert!(tip.x.abs() < 1e-4);
        assert!((tip.y + 17.0).abs() < 1e-4);

        // Mirror symmetric about the y axis.
        let a = heart_curve(1.1);
        let b = heart_curve(-1.1);
        assert!((a.x + b.x).abs() < 1e-5);
        assert!((a.y - b.y).abs() < 1e-5);
    }

    #[test]
    fn test_counts_match() {
        let generator = PointGenerator::default();
        for n in [1usize, 12, 300] {
            let shape = generator.generate(n, 2026);
            assert_eq!(shape.points.len(), n);
            assert_eq!(shape.jitter.len(), n);
        }
    }

    #[test]
    fn test_same_seed_same_shape() {
        let generator = PointGenerator::default();
        assert_eq!(generator.generate(120, 2026), generator.generate(120, 2026));

        let uniform = PointGenerator {
            sampling: Sampling::Uniform,
            ..generator
        };
        assert_eq!(uniform.generate(120, 9), uniform.generate(120, 9));
    }

    #[test]
    fn test_different_seed_different_shape() {
        let generator = PointGenerator::default();
        assert_ne!(generator.generate(50, 1), generator.generate(50, 2));
    }

    #[test]
    fn test_points_within_bounds() {
        let generator = PointGenerator::default();
        let shape = generator.generate(300, 2026);
        let s = generator.scale;
        let j = generator.position_jitter;
        for p in &shape.points {
            assert!(p.x.abs() <= 16.0 * s + j + 1e-5);
            assert!(p.y <= 13.0 * s + j && p.y >= -17.0 * s - j - 1e-5);
            assert!(p.z.abs() <= generator.depth * s + 1e-5);
        }
    }

    #[test]
    fn test_jitter_profiles_in_range() {
        let generator = PointGenerator::default();
        let shape = generator.generate(300, 77);
        let [lo, hi] = generator.jitter_amplitude;
        for profile in &shape.jitter {
            assert!(profile.amplitude >= lo && profile.amplitude <= hi);
            for phase in profile.phase.to_array() {
                assert!((0.0..=TAU).contains(&phase));
            }
        }
    }

    #[test]
    fn test_golden_angle_covers_curve_evenly() {
        // No clumping: every eighth of the parameter range gets a point.
        let mut seq = SeedSequence::new(2026);
        let phase = seq.next_range(0.0, TAU);
        let mut buckets = [0usize; 8];
        for i in 0..24 {
            let t = (phase + i as f32 * GOLDEN_ANGLE).rem_euclid(TAU);
            buckets[(t / TAU * 8.0) as usize % 8] += 1;
        }
        assert!(buckets.iter().all(|&b| b > 0), "{:?}", buckets);
    }

    #[test]
    fn test_zero_jitter_lies_on_curve_plane() {
        let generator = PointGenerator {
            depth: 0.0,
            position_jitter: 0.0,
            ..PointGenerator::default()
        };
        let shape = generator.generate(40, 5);
        assert!(shape.points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_golden_angle_starts_at_seeded_phase() {
        let generator = PointGenerator {
            depth: 0.0,
            position_jitter: 0.0,
            ..PointGenerator::default()
        };
        let seed = 41;
        let phase = TAU * crate::random::seeded_random(seed + 1);
        let shape = generator.generate(5, seed);
        for (i, point) in shape.points.iter().enumerate() {
            let t = (phase + i as f32 * GOLDEN_ANGLE).rem_euclid(TAU);
            let expected = heart_curve(t).extend(0.0) * generator.scale;
            assert!((*point - expected).length() < 1e-6, "point {}", i);
        }
    }

    #[test]
    fn test_known_points_for_default_seed() {
        let shape = PointGenerator::default().generate(12, 2026);
        assert_eq!(shape.len(), 12);

        let expected: [(Vec3, Vec3, f32); 3] = [
            (
                Vec3::new(-0.007_496, 0.465_198, -0.122_286),
                Vec3::new(0.653_787, 1.288_287, 5.939_903),
                0.005_666_9,
            ),
            (
                Vec3::new(0.540_804, -0.798_453, 0.081_057),
                Vec3::new(1.930_401, 2.946_526, 5.022_360),
                0.002_143_9,
            ),
            (
                Vec3::new(-1.372_930, 0.336_319, -0.036_146),
                Vec3::new(2.452_756, 3.166_629, 1.020_499),
                0.006_879_5,
            ),
        ];
        for (i, (point, phase, amplitude)) in expected.iter().enumerate() {
            let got = shape.points[i];
            assert!((got - *point).abs().max_element() < 1e-5, "point {}: {:?}", i, got);
            let profile = shape.jitter[i];
            let phase_error = (profile.phase - *phase).abs().max_element();
            assert!(phase_error < 1e-5, "phase {}: {:?}", i, profile.phase);
            assert!((profile.amplitude - *amplitude).abs() < 1e-6, "amplitude {}", i);
        }
    }
}
