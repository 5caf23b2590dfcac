//! Point field state: base shape, morph target, live buffer and edges.
//!
//! Per-point data is kept as parallel arrays correlated by index. The point
//! count never changes after construction; a reshape replaces coordinates,
//! jitter profiles and edges, never the count.
//!
//! ```text
//! base ──► edges            (rebuilt on reshape)
//! target ◄── morph state    (exponential approach, once per frame)
//! morph + offsets ──► live  (3·N floats, uploaded to the GPU)
//! ```

use glam::Vec3;

use crate::config::FieldConfig;
use crate::edges::EdgeList;
use crate::shape::{JitterProfile, PointGenerator};

/// Seed distance between consecutive reshape generations.
pub const RESHAPE_SEED_STRIDE: u32 = 7919;

/// The complete per-point state of one heart field.
#[derive(Debug, Clone)]
pub struct PointField {
    generator: PointGenerator,
    seed: u32,
    generation: u32,
    threshold: f32,
    pub(crate) base: Vec<Vec3>,
    pub(crate) target: Vec<Vec3>,
    pub(crate) morph: Vec<Vec3>,
    pub(crate) jitter: Vec<JitterProfile>,
    live: Vec<f32>,
    edges: EdgeList,
}

impl PointField {
    /// Generate the initial shape and its edges. The live buffer starts at
    /// the base shape.
    pub fn new(generator: PointGenerator, count: usize, seed: u32, threshold: f32) -> Self {
        let shape = generator.generate(count, seed);
        let edges = EdgeList::build(&shape.points, threshold);
        let live = shape.points.iter().flat_map(|p| p.to_array()).collect();

        Self {
            generator,
            seed,
            generation: 0,
            threshold,
            base: shape.points.clone(),
            target: shape.points.clone(),
            morph: shape.points,
            jitter: shape.jitter,
            live,
            edges,
        }
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self::new(
            PointGenerator::from_config(config),
            config.point_count as usize,
            config.seed,
            config.edge_threshold,
        )
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Number of reshapes since construction.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Starting seed used for a given generation.
    pub fn seed_for(&self, generation: u32) -> u32 {
        self.seed
            .wrapping_add(generation.wrapping_mul(RESHAPE_SEED_STRIDE))
    }

    pub fn base(&self) -> &[Vec3] {
        &self.base
    }

    pub fn target(&self) -> &[Vec3] {
        &self.target
    }

    /// Positions after the morph step, before per-frame offsets.
    pub fn morph_state(&self) -> &[Vec3] {
        &self.morph
    }

    pub fn jitter(&self) -> &[JitterProfile] {
        &self.jitter
    }

    pub fn edges(&self) -> &EdgeList {
        &self.edges
    }

    /// Flat `x, y, z` positions of the last frame, `3 · len()` floats.
    pub fn live(&self) -> &[f32] {
        &self.live
    }

    /// Live position of point `i`.
    pub fn live_point(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.live[i * 3..i * 3 + 3])
    }

    #[inline]
    pub(crate) fn write_live(&mut self, i: usize, position: Vec3) {
        position.write_to_slice(&mut self.live[i * 3..i * 3 + 3]);
    }

    /// Retarget the morph without touching the base shape or edges.
    ///
    /// Returns `false` and leaves the field unchanged if the point count
    /// does not match.
    pub fn morph_to(&mut self, target: &[Vec3]) -> bool {
        if target.len() != self.target.len() {
            return false;
        }
        self.target.copy_from_slice(target);
        true
    }

    /// Regenerate the shape from the next generation's seed.
    ///
    /// The new points become both base and target; jitter profiles and edges
    /// are rebuilt from them. The morph state is kept, so the live buffer
    /// glides from where it was to the new shape.
    pub fn reshape(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        let shape = self
            .generator
            .generate(self.len(), self.seed_for(self.generation));

        self.edges = EdgeList::build(&shape.points, self.threshold);
        self.base = shape.points.clone();
        self.target = shape.points;
        self.jitter = shape.jitter;
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field() -> PointField {
        PointField::new(PointGenerator::default(), 40, 2026, 0.38)
    }

    #[test]
    fn test_live_buffer_length() {
        for n in [1usize, 12, 300] {
            let field = PointField::new(PointGenerator::default(), n, 1, 0.4);
            assert_eq!(field.len(), n);
            assert_eq!(field.live().len(), 3 * n);
            assert_eq!(field.jitter().len(), n);
            assert_eq!(field.target().len(), n);
        }
    }

    #[test]
    fn test_live_starts_at_base() {
        let field = small_field();
        for (i, p) in field.base().iter().enumerate() {
            assert_eq!(field.live_point(i), *p);
        }
        assert_eq!(field.base(), field.target());
    }

    #[test]
    fn test_edges_built_from_base() {
        let field = small_field();
        assert_eq!(field.edges(), &EdgeList::build(field.base(), 0.38));
    }

    #[test]
    fn test_reshape_replaces_shape_not_count() {
        let mut field = small_field();
        let before = field.base().to_vec();
        let morph_before = field.morph_state().to_vec();

        assert_eq!(field.reshape(), 1);
        assert_eq!(field.len(), 40);
        assert_eq!(field.live().len(), 120);
        assert_ne!(field.base(), &before[..]);
        assert_eq!(field.base(), field.target());
        assert_eq!(field.morph_state(), &morph_before[..]);
        assert_eq!(field.edges(), &EdgeList::build(field.base(), 0.38));
    }

    #[test]
    fn test_reshape_is_reproducible() {
        let mut a = small_field();
        let mut b = small_field();
        a.reshape();
        a.reshape();
        b.reshape();
        b.reshape();
        assert_eq!(a.base(), b.base());
        assert_eq!(a.jitter(), b.jitter());

        let expected = PointGenerator::default().generate(40, a.seed_for(2));
        assert_eq!(a.base(), &expected.points[..]);
    }

    #[test]
    fn test_morph_to_checks_length() {
        let mut field = small_field();
        assert!(!field.morph_to(&[Vec3::ZERO; 3]));
        assert_eq!(field.base(), field.target());

        let shifted: Vec<Vec3> = field.base().iter().map(|p| *p + Vec3::X).collect();
        assert!(field.morph_to(&shifted));
        assert_eq!(field.target(), &shifted[..]);
        assert_ne!(field.base(), field.target());
    }
}
