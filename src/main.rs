use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use bean_viewer::cli::Cli;
use bean_viewer::config::VisualizationConfig;
use bean_viewer::controller::VisualizationController;
use bean_viewer::core::{Clock, GpuContext};
use bean_viewer::hud::{FpsCounter, Hud, HudStats, LoadingOverlay};
use bean_viewer::renderer::{BeanRenderer, HudPass};
use bean_viewer::scroll::VirtualPage;

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 960;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
const LOADING_SAFETY_SECONDS: f32 = 4.0;
const PAGE_LENGTH_VIEWPORTS: f32 = 4.0;

// === Application ===

struct App {
    config: VisualizationConfig,
    show_ui: bool,
    window: Option<Arc<Window>>,
    renderer: Option<BeanRenderer>,
    hud: Option<Hud>,
    controller: Option<VisualizationController>,
    overlay: LoadingOverlay,
    page: VirtualPage,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    fn new(config: VisualizationConfig, show_ui: bool) -> Self {
        Self {
            config,
            show_ui,
            window: None,
            renderer: None,
            hud: None,
            controller: None,
            overlay: LoadingOverlay::new(LOADING_SAFETY_SECONDS),
            page: VirtualPage::new(INITIAL_WINDOW_HEIGHT as f32, PAGE_LENGTH_VIEWPORTS),
            clock: Clock::new(),
            fps: FpsCounter::new(),
        }
    }

    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, y) => -y * VirtualPage::LINE_HEIGHT,
            MouseScrollDelta::PixelDelta(position) => -position.y as f32,
        };
        let position = self.page.scroll_by(pixels);
        if let Some(controller) = &mut self.controller {
            controller.on_scroll(position, self.page.viewport_height());
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(width, height);
        }
        if let Some(controller) = &mut self.controller {
            controller.resize(width, height);
        }
        self.page.set_viewport_height(height as f32);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();
        let fps = self.fps.record(delta);
        self.overlay.tick(delta);

        let (Some(renderer), Some(controller), Some(window)) =
            (&mut self.renderer, &mut self.controller, &self.window)
        else {
            return;
        };

        controller.tick(delta);
        let controller = &*controller;

        let hud = self.hud.as_mut().map(|hud| HudPass {
            hud,
            window,
            stats: HudStats {
                fps,
                outcome: controller.outcome(),
                motion: controller.last_motion(),
                triangles: controller
                    .asset()
                    .map(|asset| asset.parts().iter().map(|p| p.mesh.triangle_count()).sum())
                    .unwrap_or(0),
                loading: self.overlay.is_visible(),
            },
        });

        match renderer.render(controller, hud) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Surface out of memory, shutting down");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Coffee Bean")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // without a surface the viewer does nothing at all
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = gpu.size();
        if self.show_ui {
            self.hud = Some(Hud::new(&window, gpu.device(), gpu.format()));
        }
        self.renderer = Some(BeanRenderer::new(gpu, &self.config));
        self.controller = Some(VisualizationController::new(
            &self.config,
            width,
            height,
            self.overlay.ready_callback(),
        ));
        self.page.set_viewport_height(height as f32);
        self.clock = Clock::new();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(hud), Some(window)) = (&mut self.hud, &self.window) {
            if hud.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => self.on_resize(size.width, size.height),
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(delta),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => VisualizationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => VisualizationConfig::default(),
    };
    cli.apply(&mut config);
    config.validate().context("Invalid settings after applying flags")?;

    match config.provision.effective_source() {
        Some(source) => info!("Model source: {source}"),
        None => info!("No model source, showing the generated bean"),
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, !cli.no_ui);
    event_loop.run_app(&mut app)?;

    Ok(())
}
