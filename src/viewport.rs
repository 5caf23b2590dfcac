//! Viewport binding: host size, camera aspect and pointer picking.

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::FieldConfig;
use crate::ray::Plane;

/// Convert a pixel position into normalized device coordinates.
///
/// Origin at the centre, x to the right, y up. A zero-sized viewport counts
/// as one pixel so the result is always finite.
pub fn pixel_to_ndc(position: Vec2, size: (u32, u32)) -> Vec2 {
    let width = size.0.max(1) as f32;
    let height = size.1.max(1) as f32;
    Vec2::new(
        (position.x / width) * 2.0 - 1.0,
        1.0 - (position.y / height) * 2.0,
    )
}

/// Camera plus everything that depends on the host's size.
#[derive(Debug, Clone)]
pub struct Viewport {
    camera: Camera,
    size: (u32, u32),
    plane: Plane,
    pointer_world: Option<Vec3>,
}

impl Viewport {
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        let mut viewport = Self {
            camera,
            size: (width, height),
            plane: Plane::XY,
            pointer_world: None,
        };
        viewport.resize(width, height);
        viewport
    }

    pub fn from_config(config: &FieldConfig, width: u32, height: u32) -> Self {
        Self::new(
            Camera::new(config.camera_distance, config.field_of_view),
            width,
            height,
        )
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Track a new host size and resync the projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.camera.set_viewport(width, height);
    }

    pub fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        pixel_to_ndc(pixel, self.size)
    }

    /// Last resolved pointer position on the interaction plane.
    pub fn pointer_world(&self) -> Option<Vec3> {
        self.pointer_world
    }

    /// Cast the pointer onto the interaction plane.
    ///
    /// On a miss (ray parallel to the plane or hitting behind the eye) the
    /// previous position is kept and `false` is returned.
    pub fn update_pointer_world(&mut self, ndc: Vec2) -> bool {
        match self
            .camera
            .ray_through(ndc)
            .and_then(|ray| ray.intersect_plane(&self.plane))
        {
            Some(hit) => {
                self.pointer_world = Some(hit);
                true
            }
            None => {
                log::trace!("pointer ray missed the interaction plane at {:?}", ndc);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_ndc() {
        let center = pixel_to_ndc(Vec2::new(400.0, 300.0), (800, 600));
        assert!(center.length() < 1e-6);

        let top_left = pixel_to_ndc(Vec2::ZERO, (800, 600));
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = pixel_to_ndc(Vec2::new(800.0, 600.0), (800, 600));
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_pixel_to_ndc_zero_size_is_finite() {
        assert!(pixel_to_ndc(Vec2::new(10.0, 10.0), (0, 0)).is_finite());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut viewport = Viewport::new(Camera::default(), 800, 600);
        assert!((viewport.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
        viewport.resize(1920, 1080);
        assert_eq!(viewport.size(), (1920, 1080));
        assert!((viewport.camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_pointer_world_on_plane() {
        let mut viewport = Viewport::new(Camera::default(), 800, 800);
        assert!(viewport.update_pointer_world(Vec2::new(0.25, 0.5)));
        let hit = viewport.pointer_world().unwrap();
        assert!(hit.z.abs() < 1e-4);
        assert!(hit.x > 0.0 && hit.y > 0.0);
    }

    #[test]
    fn test_miss_keeps_previous_value() {
        let mut viewport = Viewport::new(Camera::default(), 800, 800);
        assert!(viewport.update_pointer_world(Vec2::ZERO));
        let previous = viewport.pointer_world();

        // Side-on camera: the centre ray runs along the plane.
        viewport.camera_mut().yaw = std::f32::consts::FRAC_PI_2;
        assert!(!viewport.update_pointer_world(Vec2::ZERO));
        assert_eq!(viewport.pointer_world(), previous);
    }
}
