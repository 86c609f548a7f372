//! egui overlay: frame rate, load outcome, scroll signal and the loading screen

use std::cell::Cell;
use std::rc::Rc;

use log::warn;
use winit::window::Window;

use crate::core::timer::{Countdown, Throttled};
use crate::provision::LoadOutcome;
use crate::render_loop::FrameMotion;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const ACCENT: egui::Color32 = egui::Color32::from_rgb(111, 78, 55);

/// Loading screen that hides when the controller reports ready, or after a safety delay
pub struct LoadingOverlay {
    ready: Rc<Cell<bool>>,
    safety: Countdown,
    forced: bool,
}

impl LoadingOverlay {
    pub fn new(safety_seconds: f32) -> Self {
        Self {
            ready: Rc::new(Cell::new(false)),
            safety: Countdown::started(safety_seconds),
            forced: false,
        }
    }

    /// Callback to hand to the controller as its ready signal
    pub fn ready_callback(&self) -> impl FnOnce() + 'static {
        let ready = self.ready.clone();
        move || ready.set(true)
    }

    pub fn tick(&mut self, delta: f32) {
        if self.ready.get() {
            self.safety.cancel();
        } else if self.safety.tick(delta) {
            warn!("Ready signal still missing, hiding the loading screen anyway");
            self.forced = true;
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.ready.get() && !self.forced
    }
}

/// Frame rate averaged over roughly one second
#[derive(Debug)]
pub struct FpsCounter {
    throttle: Throttled,
    frames: u32,
    accumulated: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        let mut throttle = Throttled::new(FPS_UPDATE_INTERVAL);
        // skip the immediate first fire so the first reading spans a full interval
        throttle.try_tick(0.0);
        Self {
            throttle,
            frames: 0,
            accumulated: 0.0,
            fps: 0.0,
        }
    }

    pub fn record(&mut self, delta: f32) -> f32 {
        self.frames += 1;
        self.accumulated += delta;
        if self.throttle.try_tick(delta) && self.accumulated > 0.0 {
            self.fps = self.frames as f32 / self.accumulated;
            self.frames = 0;
            self.accumulated = 0.0;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of what the overlay shows this frame
pub struct HudStats<'a> {
    pub fps: f32,
    pub outcome: &'a LoadOutcome,
    pub motion: FrameMotion,
    pub triangles: usize,
    pub loading: bool,
}

fn outcome_label(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Pending => "loading model".to_string(),
        LoadOutcome::Succeeded => "model ready".to_string(),
        LoadOutcome::FellBack(reason) if reason.is_timeout() => "timed out, generated bean".to_string(),
        LoadOutcome::FellBack(_) => "load failed, generated bean".to_string(),
    }
}

pub struct Hud {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Hud {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer =
            egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// True when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size: (u32, u32),
        stats: &HudStats<'_>,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("stats")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0}", stats.fps))
                            .size(32.0)
                            .color(ACCENT),
                    );
                    ui.label(egui::RichText::new("FPS").size(11.0).color(egui::Color32::GRAY));
                    ui.label(outcome_label(stats.outcome));
                    ui.label(format!("{} triangles", stats.triangles));
                    ui.label(format!(
                        "progress {:.2}  boost {:.4}",
                        stats.motion.progress, stats.motion.boost
                    ));
                });

            if stats.loading {
                egui::Area::new(egui::Id::new("loading"))
                    .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                    .show(ctx, |ui| {
                        ui.label(egui::RichText::new("Loading…").size(24.0).color(ACCENT));
                    });
            }
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, self.ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.0, size.1],
            pixels_per_point: window.scale_factor() as f32,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
