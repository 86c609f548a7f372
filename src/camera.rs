use glam::{Mat4, Vec3};

use crate::math::BoundingSphere;

/// Perspective camera looking at a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.65, 3.0),
            target: Vec3::ZERO,
            fov_y: fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// wgpu depth range [0, 1]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ignores zero-sized surfaces (minimized windows)
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Half-angle of the narrower of the two view directions
    fn limiting_half_fov(&self) -> f32 {
        let half_v = self.fov_y * 0.5;
        let half_h = (half_v.tan() * self.aspect).atan();
        half_v.min(half_h)
    }

    /// Distance at which a sphere of `radius` touches the tighter frustum pair
    pub fn fit_distance(&self, radius: f32, margin: f32) -> f32 {
        radius / self.limiting_half_fov().sin() * margin
    }

    /// True when the whole sphere lies inside the view frustum
    pub fn contains_sphere(&self, sphere: &BoundingSphere) -> bool {
        let c = self.view_matrix().transform_point3(sphere.center);
        let r = sphere.radius;
        let depth = -c.z;

        let half_v = self.fov_y * 0.5;
        let half_h = (half_v.tan() * self.aspect).atan();

        let inside_v = c.y.abs() * half_v.cos() - depth * half_v.sin() <= -r;
        let inside_h = c.x.abs() * half_h.cos() - depth * half_h.sin() <= -r;
        let inside_depth = depth - r >= self.near && depth + r <= self.far;

        inside_v && inside_h && inside_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose_looks_at_origin() {
        let camera = Camera::new(35.0, 1.5);
        let fwd = camera.forward();
        assert!(fwd.z < 0.0);
        assert!(fwd.y < 0.0);
    }

    #[test]
    fn test_fit_distance_uses_tighter_axis() {
        let wide = Camera::new(35.0, 2.0);
        let tall = Camera::new(35.0, 0.5);
        assert!(tall.fit_distance(1.0, 1.0) > wide.fit_distance(1.0, 1.0));

        let expected = 1.0 / (17.5f32).to_radians().sin();
        assert!((wide.fit_distance(1.0, 1.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_set_viewport_ignores_zero() {
        let mut camera = Camera::new(35.0, 1.0);
        camera.set_viewport(0, 600);
        assert_eq!(camera.aspect, 1.0);
        camera.set_viewport(1200, 600);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_contains_sphere_rejects_sphere_behind_camera() {
        let camera = Camera::new(35.0, 1.0);
        let behind = BoundingSphere::new(Vec3::new(0.0, 0.65, 10.0), 0.5);
        assert!(!camera.contains_sphere(&behind));
    }
}
