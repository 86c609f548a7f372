//! Per-frame ambient motion: idle spin, wobble, light drift

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::asset::Animated;
use crate::scene::SceneComposer;
use crate::scroll::ScrollCoupler;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Radians added to the spin every tick at the top of the page
    pub base_spin: f32,
    /// Share of the idle spin removed at full scroll progress
    pub spin_scroll_damping: f32,
    pub wobble_amplitude: f32,
    /// Radians per second
    pub wobble_frequency: f32,
    pub wobble_scroll_damping: f32,
    pub key_drift_amplitude: f32,
    pub key_drift_frequency: f32,
    pub rim_drift_amplitude: f32,
    pub rim_drift_frequency: f32,
    /// Uniform scale at full scroll progress
    pub min_scale: f32,
    /// Scale added back while the viewport is unscrolled
    pub scale_range: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            base_spin: 0.005,
            spin_scroll_damping: 0.95,
            wobble_amplitude: 0.05,
            wobble_frequency: 1.2,
            wobble_scroll_damping: 0.9,
            key_drift_amplitude: 0.6,
            key_drift_frequency: 0.8,
            rim_drift_amplitude: 0.3,
            rim_drift_frequency: 0.6,
            min_scale: 0.92,
            scale_range: 0.12,
        }
    }
}

impl MotionSettings {
    /// Spin per tick before boost; shrinks toward (not to) zero as progress reaches 1
    pub fn idle_spin(&self, progress: f32) -> f32 {
        self.base_spin * (1.0 - progress.clamp(0.0, 1.0) * self.spin_scroll_damping)
    }

    pub fn wobble(&self, elapsed: f32, progress: f32) -> f32 {
        (elapsed * self.wobble_frequency).sin()
            * self.wobble_amplitude
            * (1.0 - progress.clamp(0.0, 1.0) * self.wobble_scroll_damping)
    }

    pub fn visibility_scale(&self, progress: f32) -> f32 {
        self.min_scale + self.scale_range * (1.0 - progress.clamp(0.0, 1.0))
    }

    /// Largest scale `visibility_scale` yields over the whole page
    pub fn max_scale(&self) -> f32 {
        self.visibility_scale(0.0).max(self.visibility_scale(1.0))
    }
}

/// What one tick did, for diagnostics and the HUD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameMotion {
    pub progress: f32,
    pub boost: f32,
    pub spin_step: f32,
}

/// Advances ambient animation once per displayed frame
///
/// Steps are per frame, not per second: a faster display spins faster.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    settings: MotionSettings,
    key_base: Vec3,
    rim_base: Vec3,
    frames: u64,
}

impl RenderLoop {
    pub fn new(settings: MotionSettings, scene: &SceneComposer) -> Self {
        let lights = &scene.state().lights;
        Self {
            settings,
            key_base: lights.key.position,
            rim_base: lights.rim.position,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    pub fn step(
        &mut self,
        elapsed: f32,
        scroll: &mut ScrollCoupler,
        scene: &mut SceneComposer,
        asset: Option<&mut dyn Animated>,
    ) -> FrameMotion {
        self.frames += 1;

        let boost = scroll.decay();
        let progress = scroll.signal().progress;
        let calm = 1.0 - progress;
        let spin_step = self.settings.idle_spin(progress) + boost;

        if let Some(asset) = asset {
            let transform = asset.transform_mut();
            transform.spin += spin_step;
            transform.tilt = self.settings.wobble(elapsed, progress);
            transform.scale = self.settings.visibility_scale(progress);
            asset.set_surface_time(elapsed);
        }

        let lights = &mut scene.state_mut().lights;
        lights.key.position.x = self.key_base.x
            + (elapsed * self.settings.key_drift_frequency).sin()
                * self.settings.key_drift_amplitude
                * calm;
        lights.rim.position.x = self.rim_base.x
            + (elapsed * self.settings.rim_drift_frequency).cos()
                * self.settings.rim_drift_amplitude
                * calm;

        scene.apply_scroll(progress);

        FrameMotion {
            progress,
            boost,
            spin_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Material, PlaceholderBean, VisualAsset};
    use crate::geometry::BeanShape;
    use crate::scene::{CameraSettings, GroundSettings, LightRigSettings};
    use crate::scroll::ScrollSettings;

    fn scene() -> SceneComposer {
        SceneComposer::new(
            CameraSettings::default(),
            &LightRigSettings::default(),
            GroundSettings::default(),
            800,
            600,
        )
    }

    fn bean() -> VisualAsset {
        let shape = BeanShape::default().with_segments(8);
        VisualAsset::placeholder(PlaceholderBean::generate(&shape, Material::roasted_bean(), 2.1))
    }

    #[test]
    fn test_idle_spin_endpoints() {
        let motion = MotionSettings::default();
        assert!((motion.idle_spin(0.0) - 0.005).abs() < 1e-9);
        assert!((motion.idle_spin(1.0) - 0.00025).abs() < 1e-9);
    }

    #[test]
    fn test_max_scale_is_top_of_page() {
        let motion = MotionSettings::default();
        assert!((motion.max_scale() - 1.04).abs() < 1e-6);

        let shrinking = MotionSettings {
            min_scale: 1.2,
            scale_range: -0.3,
            ..MotionSettings::default()
        };
        assert!((shrinking.max_scale() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_step_without_asset_still_drifts_lights() {
        let mut scene = scene();
        let mut scroll = ScrollCoupler::new(ScrollSettings::default());
        let mut render_loop = RenderLoop::new(MotionSettings::default(), &scene);

        let t = std::f32::consts::FRAC_PI_2 / 0.8;
        render_loop.step(t, &mut scroll, &mut scene, None);

        let key = scene.state().lights.key.position;
        assert!((key.x - 2.6).abs() < 1e-5);
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn test_step_spins_and_wobbles_asset() {
        let mut scene = scene();
        let mut scroll = ScrollCoupler::new(ScrollSettings::default());
        let mut render_loop = RenderLoop::new(MotionSettings::default(), &scene);
        let mut asset = bean();

        let t = std::f32::consts::FRAC_PI_2 / 1.2;
        for _ in 0..10 {
            render_loop.step(t, &mut scroll, &mut scene, Some(&mut asset));
        }

        let transform = *asset.transform();
        assert!((transform.spin - 0.05).abs() < 1e-6);
        assert!((transform.tilt - 0.05).abs() < 1e-6);
        assert!((transform.scale - 1.04).abs() < 1e-6);
        assert_eq!(asset.surface_time(), t);
    }

    #[test]
    fn test_scrolled_page_calms_everything() {
        let mut scene = scene();
        let mut scroll = ScrollCoupler::new(ScrollSettings::default());
        let mut render_loop = RenderLoop::new(MotionSettings::default(), &scene);
        let mut asset = bean();

        // just under one viewport keeps progress near 1 with no wrap
        scroll.on_scroll(799.0, 800.0);
        for _ in 0..200 {
            render_loop.step(1.0, &mut scroll, &mut scene, Some(&mut asset));
        }
        let motion = render_loop.step(1.0, &mut scroll, &mut scene, Some(&mut asset));

        assert!(motion.progress > 0.99);
        assert!(motion.spin_step < 0.0004);
        assert!(asset.transform().tilt.abs() < 0.006);
        assert!(scene.state().ground.opacity < 0.02);
    }
}
