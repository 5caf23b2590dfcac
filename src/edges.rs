//! Line segments between nearby points.
//!
//! Every unordered pair closer than the threshold becomes one segment. The
//! pass is quadratic in the point count, which is fine for the few hundred
//! points a heart field uses. Larger clouds would want the spatial hash the
//! GPU connection pass in the particle engine uses.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One line endpoint as uploaded to the GPU: position plus a fade factor.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    /// `1 - distance / threshold`; 1 for coincident points, 0 at the threshold.
    pub fade: f32,
}

/// A segment between two base points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Indices of the endpoints, `from < to`.
    pub from: usize,
    pub to: usize,
    pub start: Vec3,
    pub end: Vec3,
}

impl Edge {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// The segment batch for one base shape. Rebuilt whole on every reshape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    threshold: f32,
}

impl EdgeList {
    /// Connect every pair of `points` closer than `threshold`.
    pub fn build(points: &[Vec3], threshold: f32) -> Self {
        let threshold_sq = threshold * threshold;
        let mut edges = Vec::new();

        for (i, &a) in points.iter().enumerate() {
            for (j, &b) in points.iter().enumerate().skip(i + 1) {
                if a.distance_squared(b) < threshold_sq {
                    edges.push(Edge {
                        from: i,
                        to: j,
                        start: a,
                        end: b,
                    });
                }
            }
        }

        Self { edges, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Two vertices per edge, in a layout ready for a line-list draw.
    pub fn vertices(&self) -> Vec<LineVertex> {
        let mut out = Vec::with_capacity(self.edges.len() * 2);
        for edge in &self.edges {
            let fade = if self.threshold > 0.0 {
                (1.0 - edge.length() / self.threshold).clamp(0.0, 1.0)
            } else {
                0.0
            };
            out.push(LineVertex {
                position: edge.start.to_array(),
                fade,
            });
            out.push(LineVertex {
                position: edge.end.to_array(),
                fade,
            });
        }
        out
    }
}

impl<'a> IntoIterator for &'a EdgeList {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}
