//! Camera, studio light rig and shadow-catching ground

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::math::{hex_to_rgb, BoundingSphere};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    /// Height angle of the framing direction above the horizon
    pub elevation_degrees: f32,
    /// Rotation of the framing direction around +Y, 0 looks down -Z
    pub azimuth_degrees: f32,
    /// Extra distance factor on top of the exact sphere fit
    pub fit_margin: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            elevation_degrees: 12.0,
            azimuth_degrees: 0.0,
            fit_margin: 1.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSettings {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereSettings {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub intensity: f32,
}

impl Default for HemisphereSettings {
    fn default() -> Self {
        Self {
            sky: hex_to_rgb(0xffffff),
            ground: hex_to_rgb(0xe6dccf),
            intensity: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRigSettings {
    pub key: LightSettings,
    pub fill: LightSettings,
    pub rim: LightSettings,
    pub hemisphere: HemisphereSettings,
    pub shadow_map_size: u32,
}

impl Default for LightRigSettings {
    fn default() -> Self {
        Self {
            key: LightSettings {
                position: [2.0, 3.0, 2.0],
                color: [1.0, 1.0, 1.0],
                intensity: 0.9,
            },
            fill: LightSettings {
                position: [-2.0, 1.0, -2.0],
                color: [1.0, 1.0, 1.0],
                intensity: 0.35,
            },
            rim: LightSettings {
                position: [-1.5, 1.6, -2.4],
                color: hex_to_rgb(0xfff1e0),
                intensity: 0.45,
            },
            hemisphere: HemisphereSettings::default(),
            shadow_map_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSettings {
    pub base_opacity: f32,
    /// Share of the opacity removed at full scroll progress
    pub scroll_fade: f32,
    /// Half-width of the ground square, in multiples of the framed radius
    ///
    /// The default keeps a 6x6 ground for the standard 1.05 radius.
    pub extent_radii: f32,
    pub shadow_color: [f32; 3],
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            base_opacity: 0.18,
            scroll_fade: 0.9,
            extent_radii: 3.0 / 1.05,
            shadow_color: [0.0, 0.0, 0.0],
        }
    }
}

/// Directional light aimed at the origin from `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    fn from_settings(settings: &LightSettings) -> Self {
        Self {
            position: Vec3::from_array(settings.position),
            color: settings.color,
            intensity: settings.intensity,
        }
    }

    /// Unit vector from the scene toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
    pub rim: DirectionalLight,
    pub hemisphere: HemisphereSettings,
    pub shadow_map_size: u32,
}

impl LightRig {
    pub fn from_settings(settings: &LightRigSettings) -> Self {
        Self {
            key: DirectionalLight::from_settings(&settings.key),
            fill: DirectionalLight::from_settings(&settings.fill),
            rim: DirectionalLight::from_settings(&settings.rim),
            hemisphere: settings.hemisphere,
            shadow_map_size: settings.shadow_map_size,
        }
    }
}

/// Horizontal shadow receiver, invisible apart from the shadows it catches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub height: f32,
    pub half_extent: f32,
    pub opacity: f32,
    pub shadow_color: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub camera: Camera,
    pub lights: LightRig,
    pub ground: Ground,
    /// Sphere the camera currently frames, once an asset arrived
    pub framed: Option<BoundingSphere>,
}

/// Owns camera, lights and ground; frames assets when they arrive
#[derive(Debug, Clone)]
pub struct SceneComposer {
    camera_settings: CameraSettings,
    ground_settings: GroundSettings,
    /// Largest uniform scale the asset is drawn at, about the origin
    max_scale: f32,
    state: SceneState,
}

impl SceneComposer {
    pub fn new(
        camera_settings: CameraSettings,
        lights: &LightRigSettings,
        ground_settings: GroundSettings,
        width: u32,
        height: u32,
    ) -> Self {
        let mut camera = Camera::new(camera_settings.fov_degrees, 1.0);
        camera.set_viewport(width, height);

        let state = SceneState {
            camera,
            lights: LightRig::from_settings(lights),
            ground: Ground {
                height: -0.9,
                half_extent: 3.0,
                opacity: ground_settings.base_opacity,
                shadow_color: ground_settings.shadow_color,
            },
            framed: None,
        };

        Self {
            camera_settings,
            ground_settings,
            max_scale: 1.0,
            state,
        }
    }

    /// Frame for an asset drawn up to `scale` times its own size; refits if already framed
    pub fn set_max_scale(&mut self, scale: f32) {
        self.max_scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        if let Some(sphere) = self.state.framed {
            self.frame(sphere);
        }
    }

    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    /// Point the camera at `sphere` so all of it is visible and seat the ground under it
    ///
    /// The asset is scaled about the origin by up to `max_scale`, so framing
    /// covers the scaled sphere while `framed` keeps the asset's own.
    pub fn frame(&mut self, sphere: BoundingSphere) {
        let sphere = BoundingSphere::new(sphere.center, sphere.radius.max(1e-3));
        let reach =
            BoundingSphere::new(sphere.center * self.max_scale, sphere.radius * self.max_scale);
        let radius = reach.radius;
        let camera = &mut self.state.camera;

        let elevation = self.camera_settings.elevation_degrees.to_radians();
        let azimuth = self.camera_settings.azimuth_degrees.to_radians();
        let direction = Vec3::new(
            elevation.cos() * azimuth.sin(),
            elevation.sin(),
            elevation.cos() * azimuth.cos(),
        );

        let distance = camera.fit_distance(radius, self.camera_settings.fit_margin);
        camera.position = reach.center + direction * distance;
        camera.target = reach.center;
        camera.near = (distance - radius * 2.0).max(radius * 0.01);
        camera.far = distance + radius * 4.0;

        let ground = &mut self.state.ground;
        ground.height = reach.bottom() - radius * 0.01;
        ground.half_extent = self.ground_settings.extent_radii * radius;

        self.state.framed = Some(sphere);

        debug!(
            "Framed sphere r={:.3} (x{:.2}) at distance {:.3} (near {:.3}, far {:.3})",
            sphere.radius, self.max_scale, distance, camera.near, camera.far
        );
    }

    /// Re-fit to a new surface size; the horizontal fit depends on aspect
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.state.camera.set_viewport(width, height);
        if let Some(sphere) = self.state.framed {
            self.frame(sphere);
        }
    }

    /// Fade the caught shadows as the viewer scrolls away
    pub fn apply_scroll(&mut self, progress: f32) {
        let settings = &self.ground_settings;
        self.state.ground.opacity =
            settings.base_opacity * (1.0 - progress.clamp(0.0, 1.0) * settings.scroll_fade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer(width: u32, height: u32) -> SceneComposer {
        SceneComposer::new(
            CameraSettings::default(),
            &LightRigSettings::default(),
            GroundSettings::default(),
            width,
            height,
        )
    }

    #[test]
    fn test_boot_state_matches_studio_defaults() {
        let scene = composer(800, 600);
        let state = scene.state();
        assert_eq!(state.camera.position, Vec3::new(0.0, 0.65, 3.0));
        assert_eq!(state.lights.key.position, Vec3::new(2.0, 3.0, 2.0));
        assert_eq!(state.ground.opacity, 0.18);
        assert!(state.framed.is_none());
    }

    #[test]
    fn test_frame_derives_clip_planes_from_radius() {
        let mut scene = composer(800, 600);
        scene.frame(BoundingSphere::new(Vec3::ZERO, 1.05));

        let camera = &scene.state().camera;
        let distance = camera.position.length();
        assert!((camera.near - (distance - 2.1)).abs() < 1e-4);
        assert!((camera.far - (distance + 4.2)).abs() < 1e-4);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_ground_sits_just_below_sphere() {
        let mut scene = composer(800, 600);
        scene.frame(BoundingSphere::new(Vec3::new(0.0, 0.5, 0.0), 2.0));
        let ground = scene.state().ground;
        assert!(ground.height < 0.5 - 2.0);
        assert!(ground.height > 0.5 - 2.0 - 0.1);
    }

    #[test]
    fn test_max_scale_moves_ground_and_camera_out() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 1.05);
        let mut plain = composer(800, 600);
        plain.frame(sphere);

        let mut scaled = composer(800, 600);
        scaled.frame(sphere);
        scaled.set_max_scale(1.04);

        let ground = scaled.state().ground;
        assert!((ground.height - (-1.05 * 1.04 * 1.01)).abs() < 1e-5);
        assert!(scaled.state().camera.position.length() > plain.state().camera.position.length());
        assert_eq!(scaled.state().framed, Some(sphere));
    }

    #[test]
    fn test_shadow_fades_with_scroll() {
        let mut scene = composer(800, 600);
        scene.apply_scroll(1.0);
        assert!((scene.state().ground.opacity - 0.018).abs() < 1e-6);
        scene.apply_scroll(0.0);
        assert_eq!(scene.state().ground.opacity, 0.18);
    }

    #[test]
    fn test_light_direction_is_normalized() {
        let rig = LightRig::from_settings(&LightRigSettings::default());
        assert!((rig.key.direction().length() - 1.0).abs() < 1e-6);
    }
}
