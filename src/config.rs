use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::provision::{PlaceholderSettings, ProvisionSettings};
use crate::render_loop::MotionSettings;
use crate::scene::{CameraSettings, GroundSettings, LightRigSettings};
use crate::scroll::ScrollSettings;

/// Everything tunable about the viewer; missing JSON fields keep their defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub provision: ProvisionSettings,
    pub placeholder: PlaceholderSettings,
    pub camera: CameraSettings,
    pub lights: LightRigSettings,
    pub ground: GroundSettings,
    pub motion: MotionSettings,
    pub scroll: ScrollSettings,
    /// sRGB clear color behind the transparent scene
    pub background: [f32; 3],
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            provision: ProvisionSettings::default(),
            placeholder: PlaceholderSettings::default(),
            camera: CameraSettings::default(),
            lights: LightRigSettings::default(),
            ground: GroundSettings::default(),
            motion: MotionSettings::default(),
            scroll: ScrollSettings::default(),
            background: [0.953, 0.929, 0.894],
        }
    }
}

impl VisualizationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading config from {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ViewerError::Config(msg));

        if self.provision.timeout_ms == 0 {
            return fail("provision.timeout_ms must be positive".into());
        }
        if self.provision.target_size <= 0.0 {
            return fail("provision.target_size must be positive".into());
        }
        for (name, [lo, hi]) in [
            ("roughness_range", self.provision.roughness_range),
            ("metalness_range", self.provision.metalness_range),
        ] {
            if !(lo <= hi) {
                return fail(format!("provision.{name} is not ordered: [{lo}, {hi}]"));
            }
        }

        let shape = &self.placeholder.shape;
        if shape.width_segments < 3 || shape.height_segments < 2 {
            return fail(format!(
                "placeholder needs at least 3x2 segments, got {}x{}",
                shape.width_segments, shape.height_segments
            ));
        }

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return fail(format!("camera.fov_degrees out of range: {}", self.camera.fov_degrees));
        }
        if !(self.scroll.decay >= 0.0 && self.scroll.decay < 1.0) {
            return fail(format!("scroll.decay must be in [0, 1): {}", self.scroll.decay));
        }
        if self.scroll.pixels_per_boost <= 0.0 {
            return fail("scroll.pixels_per_boost must be positive".into());
        }

        Ok(())
    }
}
