//! The single visual asset slot and what the render loop may do with it

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{fit_transform, generate_bean, BeanShape, Mesh};
use crate::math::{hex_to_rgb, BoundingSphere, AABB};

/// Procedural roast-stain bands modulating roughness and sheen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceNoise {
    pub enabled: bool,
    pub amplitude: f32,
    pub scale: f32,
}

impl Default for SurfaceNoise {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.08,
            scale: 3.0,
        }
    }
}

/// Physically based surface parameters, colors in sRGB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub base_color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub sheen: f32,
    pub sheen_color: [f32; 3],
    pub sheen_roughness: f32,
    pub noise: SurfaceNoise,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.7, 0.7, 0.7],
            roughness: 0.5,
            metalness: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            sheen: 0.0,
            sheen_color: [0.0, 0.0, 0.0],
            sheen_roughness: 1.0,
            noise: SurfaceNoise::default(),
        }
    }
}

impl Material {
    /// Coffee-brown physical material with sheen, clearcoat and roast stains
    pub fn roasted_bean() -> Self {
        Self {
            base_color: hex_to_rgb(0x6f4e37),
            roughness: 0.42,
            metalness: 0.08,
            clearcoat: 0.55,
            clearcoat_roughness: 0.35,
            sheen: 1.0,
            sheen_color: hex_to_rgb(0x5e3f2b),
            sheen_roughness: 0.35,
            noise: SurfaceNoise {
                enabled: true,
                ..SurfaceNoise::default()
            },
        }
    }

    pub fn clamp_pbr(&mut self, roughness: [f32; 2], metalness: [f32; 2]) {
        self.roughness = self.roughness.clamp(roughness[0], roughness[1]);
        self.metalness = self.metalness.clamp(metalness[0], metalness[1]);
    }
}

/// Object transform driven by the render loop (three.js-style XYZ Euler)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub spin: f32,
    pub tilt: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            spin: 0.0,
            tilt: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.tilt)
            * Mat4::from_rotation_y(self.spin)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// One drawable piece of an asset
#[derive(Debug, Clone)]
pub struct AssetPart {
    pub mesh: Mesh,
    pub material: Material,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
}

/// Model decoded from an external file
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub name: String,
    pub parts: Vec<AssetPart>,
}

impl LoadedModel {
    pub fn bounds(&self) -> Option<AABB> {
        self.parts
            .iter()
            .filter_map(|part| part.mesh.bounds())
            .reduce(|a, b| a.union(&b))
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|part| part.mesh.triangle_count()).sum()
    }

    /// Prepare a freshly decoded model for display
    ///
    /// Every part casts (and does not receive) shadows, material roughness
    /// and metalness are clamped into the given ranges, and the whole model
    /// is centered on the origin with its largest box edge at `target_size`.
    pub fn normalize(&mut self, target_size: f32, roughness: [f32; 2], metalness: [f32; 2]) {
        for part in &mut self.parts {
            part.casts_shadow = true;
            part.receives_shadow = false;
            part.material.clamp_pbr(roughness, metalness);
        }

        if let Some(bounds) = self.bounds() {
            let fit = fit_transform(&bounds, target_size);
            for part in &mut self.parts {
                part.mesh.transform(&fit);
            }
        }
    }
}

/// Generated fallback bean, owned entirely by the controller
#[derive(Debug, Clone)]
pub struct PlaceholderBean {
    pub part: AssetPart,
    /// Drives the drift of the roast-stain noise
    pub surface_time: f32,
}

impl PlaceholderBean {
    pub fn generate(shape: &BeanShape, material: Material, target_size: f32) -> Self {
        let mut mesh = generate_bean(shape);
        mesh.fit_to_size(target_size);

        Self {
            part: AssetPart {
                mesh,
                material,
                casts_shadow: true,
                receives_shadow: false,
            },
            surface_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Loaded,
    Placeholder,
}

/// The active visual, with the transform the render loop animates
#[derive(Debug, Clone)]
pub enum VisualAsset {
    Loaded(LoadedModel, Transform),
    Placeholder(PlaceholderBean, Transform),
}

impl VisualAsset {
    pub fn loaded(model: LoadedModel) -> Self {
        VisualAsset::Loaded(model, Transform::default())
    }

    pub fn placeholder(bean: PlaceholderBean) -> Self {
        VisualAsset::Placeholder(bean, Transform::default())
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            VisualAsset::Loaded(..) => AssetKind::Loaded,
            VisualAsset::Placeholder(..) => AssetKind::Placeholder,
        }
    }

    pub fn parts(&self) -> &[AssetPart] {
        match self {
            VisualAsset::Loaded(model, _) => &model.parts,
            VisualAsset::Placeholder(bean, _) => std::slice::from_ref(&bean.part),
        }
    }

    pub fn surface_time(&self) -> f32 {
        match self {
            VisualAsset::Loaded(..) => 0.0,
            VisualAsset::Placeholder(bean, _) => bean.surface_time,
        }
    }

    /// Sphere around every vertex of every part, in model space
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.parts()
            .iter()
            .filter_map(|part| part.mesh.bounding_sphere())
            .reduce(|a, b| a.union(&b))
    }
}

/// What the render loop is allowed to change on the active asset
pub trait Animated {
    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Time fed to animated material effects, in seconds
    fn set_surface_time(&mut self, _seconds: f32) {}
}

impl Animated for VisualAsset {
    fn transform(&self) -> &Transform {
        match self {
            VisualAsset::Loaded(_, t) | VisualAsset::Placeholder(_, t) => t,
        }
    }

    fn transform_mut(&mut self) -> &mut Transform {
        match self {
            VisualAsset::Loaded(_, t) | VisualAsset::Placeholder(_, t) => t,
        }
    }

    fn set_surface_time(&mut self, seconds: f32) {
        if let VisualAsset::Placeholder(bean, _) = self {
            bean.surface_time = seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_part(offset: Vec3, size: f32, material: Material) -> AssetPart {
        let h = size * 0.5;
        let positions = vec![
            offset + Vec3::new(-h, -h, -h),
            offset + Vec3::new(h, -h, -h),
            offset + Vec3::new(h, h, h),
        ];
        AssetPart {
            mesh: Mesh::from_triangles(positions, vec![0, 1, 2]),
            material,
            casts_shadow: false,
            receives_shadow: true,
        }
    }

    #[test]
    fn test_normalize_fits_union_of_parts() {
        let mut model = LoadedModel {
            name: "two".into(),
            parts: vec![
                cube_part(Vec3::new(100.0, 0.0, 0.0), 10.0, Material::default()),
                cube_part(Vec3::new(120.0, 0.0, 0.0), 10.0, Material::default()),
            ],
        };
        model.normalize(2.1, [0.38, 0.52], [0.04, 0.12]);

        let bounds = model.bounds().unwrap();
        assert!(bounds.center().length() < 1e-4);
        assert!((bounds.max_extent() - 2.1).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_sets_shadow_flags_and_clamps() {
        let shiny = Material {
            roughness: 0.05,
            metalness: 1.0,
            ..Material::default()
        };
        let mut model = LoadedModel {
            name: "shiny".into(),
            parts: vec![cube_part(Vec3::ZERO, 1.0, shiny)],
        };
        model.normalize(2.1, [0.38, 0.52], [0.04, 0.12]);

        let part = &model.parts[0];
        assert!(part.casts_shadow);
        assert!(!part.receives_shadow);
        assert_eq!(part.material.roughness, 0.38);
        assert_eq!(part.material.metalness, 0.12);
    }

    #[test]
    fn test_placeholder_is_fitted() {
        let shape = BeanShape::default().with_segments(48);
        let bean = PlaceholderBean::generate(&shape, Material::roasted_bean(), 2.1);
        let bounds = bean.part.mesh.bounds().unwrap();
        assert!((bounds.max_extent() - 2.1).abs() < 1e-4);
        assert!(bounds.center().length() < 1e-4);
    }

    #[test]
    fn test_animated_transform_is_shared_across_variants() {
        let shape = BeanShape::default().with_segments(8);
        let mut asset =
            VisualAsset::placeholder(PlaceholderBean::generate(&shape, Material::default(), 1.0));
        asset.transform_mut().spin = 1.5;
        assert_eq!(asset.transform().spin, 1.5);
        assert_eq!(asset.kind(), AssetKind::Placeholder);
        assert_eq!(asset.parts().len(), 1);

        asset.set_surface_time(2.0);
        assert_eq!(asset.surface_time(), 2.0);
    }

    #[test]
    fn test_loaded_model_ignores_surface_time() {
        let mut asset = VisualAsset::loaded(LoadedModel::default());
        asset.set_surface_time(3.0);
        assert_eq!(asset.surface_time(), 0.0);
        assert!(asset.bounding_sphere().is_none());
    }

    #[test]
    fn test_transform_matrix_identity_by_default() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }
}
