//! Viewing context: turns pointer coordinates into world rays

use glam::{Mat4, Vec2, Vec3};

use crate::raycast::Ray;

/// Anything that can cast a ray through a viewport position
pub trait ViewContext {
    /// World-space ray through `pointer` (viewport pixels, origin top-left)
    fn ray_through(&self, pointer: Vec2) -> Option<Ray>;
}

/// Camera described by its view-projection matrix and viewport size
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    clip_from_world: Mat4,
    world_from_clip: Mat4,
    viewport: Vec2,
}

impl Camera {
    pub fn new(clip_from_world: Mat4, viewport: Vec2) -> Self {
        Self {
            clip_from_world,
            world_from_clip: clip_from_world.inverse(),
            viewport,
        }
    }

    /// Right-handed perspective camera looking from `eye` at `target`
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, viewport: Vec2) -> Self {
        let aspect = if viewport.y > 0.0 { viewport.x / viewport.y } else { 1.0 };
        let projection = Mat4::perspective_rh(fov_y, aspect, 0.01, 1000.0);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        Self::new(projection * view, viewport)
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Project a world point to viewport pixels
    pub fn world_to_viewport(&self, point: Vec3) -> Vec2 {
        let ndc = self.clip_from_world.project_point3(point);
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        )
    }
}

impl ViewContext for Camera {
    fn ray_through(&self, pointer: Vec2) -> Option<Ray> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            pointer.x / self.viewport.x * 2.0 - 1.0,
            1.0 - pointer.y / self.viewport.y * 2.0,
        );
        let near = self.world_from_clip.project_point3(ndc.extend(0.0));
        let far = self.world_from_clip.project_point3(ndc.extend(1.0));
        let direction = far - near;
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            return None;
        }
        Some(Ray::new(near, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::perspective(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_4,
            Vec2::new(800.0, 600.0),
        );
        let ray = camera.ray_through(Vec2::new(400.0, 300.0)).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_projection_round_trip() {
        let camera = Camera::perspective(
            Vec3::new(2.0, 1.0, 5.0),
            Vec3::ZERO,
            1.0,
            Vec2::new(640.0, 480.0),
        );
        let point = Vec3::new(0.3, -0.2, 0.1);
        let pixel = camera.world_to_viewport(point);
        let ray = camera.ray_through(pixel).unwrap();
        let to_point = (point - ray.origin).normalize();
        assert!(to_point.dot(ray.direction) > 0.9999);
    }

    #[test]
    fn test_empty_viewport() {
        let camera = Camera::new(Mat4::IDENTITY, Vec2::ZERO);
        assert!(camera.ray_through(Vec2::ZERO).is_none());
    }
}
