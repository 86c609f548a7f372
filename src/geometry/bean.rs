use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{uv_sphere, Mesh};

/// Tessellation and deformation constants for the placeholder bean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeanShape {
    pub width_segments: u32,
    pub height_segments: u32,
    /// Per-axis squash applied to the unit sphere (almond silhouette)
    pub axis_scale: [f32; 3],
    /// Gaussian falloff rate of the groove along Z
    pub groove_falloff: f32,
    /// Inward pull at the center of the groove
    pub groove_depth: f32,
}

impl Default for BeanShape {
    fn default() -> Self {
        Self {
            width_segments: 144,
            height_segments: 144,
            axis_scale: [0.94, 0.78, 1.10],
            groove_falloff: 1.9,
            groove_depth: 0.26,
        }
    }
}

impl BeanShape {
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.width_segments = segments;
        self.height_segments = segments;
        self
    }

    /// Displace one unit-sphere vertex into bean space
    pub fn deform(&self, v: Vec3) -> Vec3 {
        let [sx, sy, sz] = self.axis_scale;
        let mut p = Vec3::new(v.x * sx, v.y * sy, v.z * sz);

        let groove = (-(p.z * self.groove_falloff).powi(2)).exp() * self.groove_depth;
        // zero of either sign counts as the positive side
        let side = if p.x < 0.0 { -1.0 } else { 1.0 };
        p.x -= side * groove;

        p
    }
}

/// Build the placeholder bean mesh in its natural (unfitted) size
///
/// Pure function of `shape`: identical input always produces bit-identical
/// vertex positions.
pub fn generate_bean(shape: &BeanShape) -> Mesh {
    let sphere = uv_sphere(shape.width_segments, shape.height_segments);
    let positions = sphere.positions.into_iter().map(|v| shape.deform(v)).collect();

    Mesh::from_triangles(positions, sphere.indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deform_squashes_axes() {
        let shape = BeanShape::default();
        let top = shape.deform(Vec3::Y);
        assert!((top.y - 0.78).abs() < 1e-6);

        let tip = shape.deform(Vec3::Z);
        assert!((tip.z - 1.10).abs() < 1e-6);
    }

    #[test]
    fn test_groove_pulls_toward_center_plane() {
        let shape = BeanShape::default();
        let right = shape.deform(Vec3::X);
        let left = shape.deform(-Vec3::X);
        assert!((right.x - (0.94 - 0.26)).abs() < 1e-6);
        assert!((left.x + (0.94 - 0.26)).abs() < 1e-6);
    }

    #[test]
    fn test_negative_zero_uses_positive_side() {
        let shape = BeanShape::default();
        let p = shape.deform(Vec3::new(-0.0, 1.0, 0.0));
        assert!((p.x + 0.26).abs() < 1e-6);
    }

    #[test]
    fn test_groove_fades_at_tips() {
        let shape = BeanShape::default();
        let near_tip = shape.deform(Vec3::new(0.1, 0.0, 0.99));
        assert!((near_tip.x - 0.094).abs() < 0.01);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let shape = BeanShape::default().with_segments(32);
        let a = generate_bean(&shape);
        let b = generate_bean(&shape);
        assert_eq!(a, b);
    }
}
