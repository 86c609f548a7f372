use glam::{Mat4, Vec3};

use crate::asset::{AssetPart, Material};
use crate::math::srgb_to_linear;
use crate::scene::{DirectionalLight, Ground, SceneState};

/// Mesh vertex as uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn from_part(part: &AssetPart) -> Vec<Vertex> {
        part.mesh
            .positions
            .iter()
            .zip(&part.mesh.normals)
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }
}

/// Camera and light rig, shared by every pass
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4], // w = elapsed seconds
    pub key_direction: [f32; 4],   // w = intensity
    pub key_color: [f32; 4],
    pub fill_direction: [f32; 4],
    pub fill_color: [f32; 4],
    pub rim_direction: [f32; 4],
    pub rim_color: [f32; 4],
    pub sky_color: [f32; 4], // w = hemisphere intensity
    pub ground_color: [f32; 4],
}

fn light_terms(light: &DirectionalLight) -> ([f32; 4], [f32; 4]) {
    let [r, g, b] = srgb_to_linear(light.color);
    (light.direction().extend(light.intensity).to_array(), [r, g, b, 1.0])
}

fn linear4(srgb: [f32; 3], w: f32) -> [f32; 4] {
    let [r, g, b] = srgb_to_linear(srgb);
    [r, g, b, w]
}

impl SceneUniform {
    pub fn new(scene: &SceneState, light_view_proj: Mat4, elapsed: f32) -> Self {
        let (key_direction, key_color) = light_terms(&scene.lights.key);
        let (fill_direction, fill_color) = light_terms(&scene.lights.fill);
        let (rim_direction, rim_color) = light_terms(&scene.lights.rim);
        let hemisphere = &scene.lights.hemisphere;

        Self {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            camera_position: scene.camera.position.extend(elapsed).to_array(),
            key_direction,
            key_color,
            fill_direction,
            fill_color,
            rim_direction,
            rim_color,
            sky_color: linear4(hemisphere.sky, hemisphere.intensity),
            ground_color: linear4(hemisphere.ground, 1.0),
        }
    }
}

/// Per-part transform and material
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub pbr: [f32; 4],   // roughness, metalness, clearcoat, clearcoat roughness
    pub sheen: [f32; 4], // sheen color, sheen weight
    pub noise: [f32; 4], // enabled, amplitude, scale, surface time
    pub extra: [f32; 4], // sheen roughness, receives shadow
}

impl ModelUniform {
    pub fn new(model: Mat4, material: &Material, receives_shadow: bool, surface_time: f32) -> Self {
        let noise = &material.noise;
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            base_color: linear4(material.base_color, 1.0),
            pbr: [
                material.roughness,
                material.metalness,
                material.clearcoat,
                material.clearcoat_roughness,
            ],
            sheen: linear4(material.sheen_color, material.sheen),
            noise: [
                if noise.enabled { 1.0 } else { 0.0 },
                noise.amplitude,
                noise.scale,
                surface_time,
            ],
            extra: [
                material.sheen_roughness,
                if receives_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

/// Shadow-catching ground quad
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GroundUniform {
    pub model: [[f32; 4]; 4],
    pub shadow_color: [f32; 4], // w = opacity
}

impl GroundUniform {
    pub fn new(ground: &Ground) -> Self {
        let model = Mat4::from_translation(Vec3::new(0.0, ground.height, 0.0))
            * Mat4::from_scale(Vec3::new(ground.half_extent, 1.0, ground.half_extent));
        Self {
            model: model.to_cols_array_2d(),
            shadow_color: linear4(ground.shadow_color, ground.opacity),
        }
    }
}
