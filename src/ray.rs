//! Rays and planes for pointer picking.

use glam::Vec3;

/// Denominators smaller than this are treated as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; `direction` is normalized. Returns `None` for a zero or
    /// non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Where this ray meets `plane`, if it does in front of the origin.
    ///
    /// Parallel rays and hits behind the origin return `None`.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = self.direction.dot(plane.normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (plane.constant - self.origin.dot(plane.normal)) / denom;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }
}

/// The set of points `p` with `normal · p = constant`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// The `z = 0` plane the heart lies in.
    pub const XY: Plane = Plane {
        normal: Vec3::Z,
        constant: 0.0,
    };

    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }
}
