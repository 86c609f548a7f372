use glam::{Mat3, Mat4, Vec3};

use crate::math::{BoundingSphere, AABB};

/// Indexed triangle list with per-vertex normals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh and compute smooth normals from its faces
    pub fn from_triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            indices,
        };
        mesh.compute_vertex_normals();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.len() < 3
    }

    /// Accumulate area-weighted face normals into every vertex, then normalize
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let face = (pc - pb).cross(pa - pb);

            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.positions.iter().copied())
    }

    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        BoundingSphere::from_points(&self.positions)
    }

    /// Bake an affine transform into positions and normals
    pub fn transform(&mut self, matrix: &Mat4) {
        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();

        for p in &mut self.positions {
            *p = matrix.transform_point3(*p);
        }
        for n in &mut self.normals {
            *n = (normal_matrix * *n).normalize_or_zero();
        }
    }

    /// Center on the origin and scale so the largest box edge equals `target_size`
    pub fn fit_to_size(&mut self, target_size: f32) {
        if let Some(bounds) = self.bounds() {
            self.transform(&fit_transform(&bounds, target_size));
        }
    }
}

/// Transform that moves `bounds` to the origin and scales its largest edge to `target_size`
///
/// Degenerate boxes (all points coincident) are only translated.
pub fn fit_transform(bounds: &AABB, target_size: f32) -> Mat4 {
    let extent = bounds.max_extent();
    let scale = if extent > f32::EPSILON {
        target_size / extent
    } else {
        1.0
    };

    Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-bounds.center())
}
