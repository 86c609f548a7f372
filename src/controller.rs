//! The visualization controller: one object owning provisioner, scene,
//! scroll state, render loop state and the asset slot.

use log::info;

use crate::asset::{Animated, VisualAsset};
use crate::config::VisualizationConfig;
use crate::provision::{LoadOutcome, ModelProvisioner};
use crate::render_loop::{FrameMotion, RenderLoop};
use crate::scene::{SceneComposer, SceneState};
use crate::scroll::{ScrollCoupler, ScrollSignal};

/// One-shot notification consumed by whoever hides the loading screen
pub struct ReadySignal {
    callback: Option<Box<dyn FnOnce() + 'static>>,
}

impl ReadySignal {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn has_fired(&self) -> bool {
        self.callback.is_none()
    }

    /// Invoke the callback the first time; later calls do nothing
    pub fn fire(&mut self) -> bool {
        match self.callback.take() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

pub struct VisualizationController {
    provisioner: ModelProvisioner,
    scene: SceneComposer,
    scroll: ScrollCoupler,
    render_loop: RenderLoop,
    asset: Option<VisualAsset>,
    /// Bumped whenever the asset slot changes, so GPU copies can be refreshed
    asset_generation: u64,
    ready: ReadySignal,
    elapsed: f32,
    last_motion: FrameMotion,
}

impl VisualizationController {
    /// Build the scene immediately and start provisioning the asset
    pub fn new(
        config: &VisualizationConfig,
        width: u32,
        height: u32,
        on_ready: impl FnOnce() + 'static,
    ) -> Self {
        let provisioner = ModelProvisioner::start(&config.provision, config.placeholder.clone());
        Self::with_provisioner(config, provisioner, width, height, on_ready)
    }

    /// Same as `new`, around a provisioner that is already running
    pub fn with_provisioner(
        config: &VisualizationConfig,
        provisioner: ModelProvisioner,
        width: u32,
        height: u32,
        on_ready: impl FnOnce() + 'static,
    ) -> Self {
        let mut scene =
            SceneComposer::new(config.camera, &config.lights, config.ground, width, height);
        let render_loop = RenderLoop::new(config.motion, &scene);
        scene.set_max_scale(render_loop.settings().max_scale());

        Self {
            provisioner,
            scene,
            scroll: ScrollCoupler::new(config.scroll),
            render_loop,
            asset: None,
            asset_generation: 0,
            ready: ReadySignal::new(on_ready),
            elapsed: 0.0,
            last_motion: FrameMotion::default(),
        }
    }

    /// Page scroll event, in pixels from the top
    pub fn on_scroll(&mut self, position: f32, viewport_height: f32) {
        self.scroll.on_scroll(position, viewport_height);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    /// One display frame: settle the asset if possible, then animate
    pub fn tick(&mut self, delta: f32) -> FrameMotion {
        self.elapsed += delta;

        if let Some(settlement) = self.provisioner.poll(delta) {
            if let Some(sphere) = settlement.asset.bounding_sphere() {
                self.scene.frame(sphere);
            }
            info!("Showing {:?} asset ({:?})", settlement.asset.kind(), settlement.outcome);
            self.asset = Some(settlement.asset);
            self.asset_generation += 1;

            if self.ready.fire() {
                info!("Visualization ready after {:.2}s", self.elapsed);
            }
        }

        let asset = self.asset.as_mut().map(|a| a as &mut dyn Animated);
        self.last_motion = self
            .render_loop
            .step(self.elapsed, &mut self.scroll, &mut self.scene, asset);
        self.last_motion
    }

    pub fn asset(&self) -> Option<&VisualAsset> {
        self.asset.as_ref()
    }

    pub fn asset_generation(&self) -> u64 {
        self.asset_generation
    }

    pub fn scene(&self) -> &SceneState {
        self.scene.state()
    }

    pub fn scroll_signal(&self) -> ScrollSignal {
        self.scroll.signal()
    }

    pub fn outcome(&self) -> &LoadOutcome {
        self.provisioner.outcome()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.has_fired()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_motion(&self) -> FrameMotion {
        self.last_motion
    }

    pub fn frames(&self) -> u64 {
        self.render_loop.frames()
    }
}
