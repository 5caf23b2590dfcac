//! Orbit camera and perspective projection.

use glam::{Mat4, Vec2, Vec3};

use crate::ray::Ray;

/// Yaw speed of the optional orbit drift, radians per second.
const ORBIT_SPEED: f32 = 0.12;

/// Orbit camera looking at the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians. Zero looks down -Z.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// World-space shift applied to the eye, not the target.
    pub offset: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera on the +Z axis at `distance`, looking at the origin.
    pub fn new(distance: f32, fov_degrees: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target: Vec3::ZERO,
            offset: Vec3::ZERO,
            fov_y: fov_degrees.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 50.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z) + self.offset
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Resync the aspect ratio to a viewport size. A zero height counts as 1.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Drift around the target over time and lean toward the pointer.
    pub fn orbit(&mut self, elapsed: f32, pointer_ndc: Vec2) {
        self.yaw = elapsed * ORBIT_SPEED;
        self.offset = Vec3::new(pointer_ndc.x * 0.6, -pointer_ndc.y * 0.3, pointer_ndc.x * 0.12);
    }

    /// Ray from the eye through a point in normalized device coordinates.
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray> {
        let inverse = self.view_proj().inverse();
        // glam's perspective_rh maps the far plane to depth 1.
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let origin = self.position();
        Ray::new(origin, far - origin)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(3.4, 55.0)
    }
}
