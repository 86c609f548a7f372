use glam::{Mat4, Vec3};
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::asset::{Animated, VisualAsset};
use crate::config::VisualizationConfig;
use crate::controller::VisualizationController;
use crate::core::gpu_context::GpuContext;
use crate::hud::{Hud, HudStats};
use crate::math::{srgb_to_linear, BoundingSphere};
use crate::scene::DirectionalLight;
use crate::types::{GroundUniform, ModelUniform, SceneUniform, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Sphere the shadow camera covers before any asset is framed
const DEFAULT_SHADOW_SPHERE: BoundingSphere = BoundingSphere {
    center: Vec3::ZERO,
    radius: 1.05,
};

/// Orthographic view-projection looking from `light` at `sphere`
///
/// Covers the sphere with room for the scale and wobble the render loop applies.
pub fn light_view_proj(light: &DirectionalLight, sphere: &BoundingSphere) -> Mat4 {
    let direction = match light.direction() {
        d if d == Vec3::ZERO => Vec3::Y,
        d => d,
    };
    let radius = sphere.radius.max(1e-3);
    let eye = sphere.center + direction * radius * 4.0;
    let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };

    let view = Mat4::look_at_rh(eye, sphere.center, up);
    let half = radius * 1.5;
    let proj = Mat4::orthographic_rh(-half, half, -half, half, radius, radius * 8.0);
    proj * view
}

/// GPU copy of one asset part
struct GpuPart {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    casts_shadow: bool,
}

/// Optional egui overlay drawn on top of the scene
pub struct HudPass<'a> {
    pub hud: &'a mut Hud,
    pub window: &'a Window,
    pub stats: HudStats<'a>,
}

pub struct BeanRenderer {
    gpu: GpuContext,
    depth_view: wgpu::TextureView,
    shadow_view: wgpu::TextureView,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    light_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    lit_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    ground_buffer: wgpu::Buffer,
    ground_bind_group: wgpu::BindGroup,
    parts: Vec<GpuPart>,
    uploaded_generation: u64,
    clear_color: wgpu::Color,
}

impl BeanRenderer {
    pub fn new(gpu: GpuContext, config: &VisualizationConfig) -> Self {
        let device = gpu.device();
        let (width, height) = gpu.size();
        let shadow_size = config.lights.shadow_map_size.max(1);

        let depth_view = Self::create_depth_texture(device, width, height);
        let shadow_view = Self::create_shadow_texture(device, shadow_size);
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Buffer"),
            size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        });
        // the shadow pass cannot see the shadow map it is writing
        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            label: Some("light_bind_group_layout"),
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            label: Some("model_bind_group_layout"),
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
            label: Some("scene_bind_group"),
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });

        let ground_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Ground Buffer"),
            size: std::mem::size_of::<GroundUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let ground_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ground_buffer.as_entire_binding(),
            }],
            label: Some("ground_bind_group"),
        });

        let lit_pipeline =
            Self::create_lit_pipeline(device, &scene_layout, &model_layout, gpu.format());
        let shadow_pipeline = Self::create_shadow_pipeline(device, &light_layout, &model_layout);
        let ground_pipeline =
            Self::create_ground_pipeline(device, &scene_layout, &model_layout, gpu.format());

        let [r, g, b] = srgb_to_linear(config.background);
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        info!("Renderer ready: shadow map {shadow_size}x{shadow_size}");

        Self {
            gpu,
            depth_view,
            shadow_view,
            scene_buffer,
            scene_bind_group,
            light_bind_group,
            model_layout,
            lit_pipeline,
            shadow_pipeline,
            ground_pipeline,
            ground_buffer,
            ground_bind_group,
            parts: Vec::new(),
            uploaded_generation: 0,
            clear_color,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.gpu.resize(width, height) {
            self.depth_view = Self::create_depth_texture(self.gpu.device(), width, height);
        }
    }

    /// Draw the controller's current state, plus the HUD when given
    pub fn render(
        &mut self,
        controller: &VisualizationController,
        hud: Option<HudPass<'_>>,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        if controller.asset_generation() != self.uploaded_generation {
            self.upload_asset(controller.asset());
            self.uploaded_generation = controller.asset_generation();
        }

        let scene = controller.scene();
        let sphere = scene.framed.unwrap_or(DEFAULT_SHADOW_SPHERE);
        let light_matrix = light_view_proj(&scene.lights.key, &sphere);
        let queue = self.gpu.queue();

        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniform::new(scene, light_matrix, controller.elapsed())]),
        );
        queue.write_buffer(
            &self.ground_buffer,
            0,
            bytemuck::cast_slice(&[GroundUniform::new(&scene.ground)]),
        );
        if let Some(asset) = controller.asset() {
            self.write_part_uniforms(asset);
        }

        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Shadow pass - depth from the key light
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &self.light_bind_group, &[]);
            for part in self.parts.iter().filter(|p| p.casts_shadow) {
                draw_part(&mut shadow_pass, part);
            }
        }

        // Scene pass - bean, then the transparent ground
        {
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            scene_pass.set_pipeline(&self.lit_pipeline);
            scene_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            for part in &self.parts {
                draw_part(&mut scene_pass, part);
            }

            if scene.ground.opacity > 0.0 {
                scene_pass.set_pipeline(&self.ground_pipeline);
                scene_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                scene_pass.set_bind_group(1, &self.ground_bind_group, &[]);
                scene_pass.draw(0..6, 0..1);
            }
        }

        if let Some(pass) = hud {
            pass.hud.paint(
                pass.window,
                self.gpu.device(),
                self.gpu.queue(),
                &mut encoder,
                &view,
                self.gpu.size(),
                &pass.stats,
            );
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Replace the GPU copies of the asset's parts
    fn upload_asset(&mut self, asset: Option<&VisualAsset>) {
        self.parts.clear();
        let Some(asset) = asset else {
            return;
        };

        let device = self.gpu.device();
        for part in asset.parts() {
            if part.mesh.is_empty() {
                continue;
            }

            let vertices = Vertex::from_part(part);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Part Vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Part Indices"),
                contents: bytemuck::cast_slice(&part.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Part Uniform"),
                size: std::mem::size_of::<ModelUniform>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.model_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
                label: Some("part_bind_group"),
            });

            self.parts.push(GpuPart {
                vertex_buffer,
                index_buffer,
                index_count: part.mesh.indices.len() as u32,
                uniform_buffer,
                bind_group,
                casts_shadow: part.casts_shadow,
            });
        }

        debug!(
            "Uploaded {} parts ({} triangles)",
            self.parts.len(),
            self.parts.iter().map(|p| p.index_count / 3).sum::<u32>()
        );
    }

    fn write_part_uniforms(&self, asset: &VisualAsset) {
        let model = asset.transform().matrix();
        let surface_time = asset.surface_time();
        let uploaded = asset.parts().iter().filter(|part| !part.mesh.is_empty());

        for (gpu_part, part) in self.parts.iter().zip(uploaded) {
            let uniform =
                ModelUniform::new(model, &part.material, part.receives_shadow, surface_time);
            self.gpu
                .queue()
                .write_buffer(&gpu_part.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_shadow_texture(device: &wgpu::Device, size: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_lit_pipeline(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bean Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bean.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[scene_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // imported models are not guaranteed to be closed or consistently wound
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_shadow_pipeline(
        device: &wgpu::Device,
        light_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[light_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_ground_pipeline(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ground Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ground.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ground Pipeline Layout"),
            bind_group_layouts: &[scene_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ground Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn draw_part(pass: &mut wgpu::RenderPass<'_>, part: &GpuPart) {
    pass.set_bind_group(1, &part.bind_group, &[]);
    pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
    pass.set_index_buffer(part.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..part.index_count, 0, 0..1);
}
