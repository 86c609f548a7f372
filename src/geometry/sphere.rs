use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::Mesh;

/// Unit sphere split into latitude/longitude bands
///
/// The vertex grid is `(width_segments + 1) * (height_segments + 1)`: both
/// poles are rows of coincident vertices and the seam column is duplicated.
/// The first and last bands emit one triangle per quad so no degenerate
/// faces touch the poles.
pub fn uv_sphere(width_segments: u32, height_segments: u32) -> Mesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let row = width_segments + 1;

    let mut positions = Vec::with_capacity((row * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            positions.push(Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh::from_triangles(positions, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_grid_size() {
        let mesh = uv_sphere(16, 8);
        assert_eq!(mesh.vertex_count(), 17 * 9);
    }

    #[test]
    fn test_pole_bands_emit_single_triangles() {
        let mesh = uv_sphere(16, 8);
        // 16 quads per band, poles lose one triangle each
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2 - 2 * 16);
    }

    #[test]
    fn test_all_vertices_on_unit_sphere() {
        let mesh = uv_sphere(12, 6);
        for p in &mesh.positions {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = uv_sphere(24, 12);
        // one pole vertex per cap is never indexed and keeps a zero normal
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            if *n == Vec3::ZERO {
                continue;
            }
            assert!(p.dot(*n) > 0.9, "inward normal at {p:?}");
        }
    }

    #[test]
    fn test_small_segment_counts_are_raised() {
        let mesh = uv_sphere(0, 0);
        assert_eq!(mesh.vertex_count(), 4 * 3);
    }
}
