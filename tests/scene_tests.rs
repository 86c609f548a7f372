use bean_viewer::math::BoundingSphere;
use bean_viewer::scene::{CameraSettings, GroundSettings, LightRigSettings, SceneComposer};
use bean_viewer::scroll::{scroll_progress, ticks_to_quench, ScrollCoupler, ScrollSettings};
use glam::Vec3;

fn composer(width: u32, height: u32) -> SceneComposer {
    SceneComposer::new(
        CameraSettings::default(),
        &LightRigSettings::default(),
        GroundSettings::default(),
        width,
        height,
    )
}

#[cfg(test)]
mod scene_tests {
    use super::*;

    #[test]
    fn test_framing_contains_sphere_for_any_aspect() {
        let sphere = BoundingSphere::new(Vec3::new(0.3, -0.2, 0.1), 1.05);
        for (width, height) in [(400, 800), (800, 800), (1600, 800), (3000, 600)] {
            let mut scene = composer(width, height);
            scene.frame(sphere);
            assert!(
                scene.state().camera.contains_sphere(&sphere),
                "sphere clipped at {width}x{height}"
            );
        }
    }

    #[test]
    fn test_framing_elevation_is_twelve_degrees() {
        let mut scene = composer(800, 800);
        scene.frame(BoundingSphere::new(Vec3::ZERO, 1.0));

        let offset = scene.state().camera.position;
        let elevation = (offset.y / offset.length()).asin().to_degrees();
        assert!((elevation - 12.0).abs() < 1e-3);
        assert!(offset.x.abs() < 1e-5);
        assert!(offset.z > 0.0);
    }

    #[test]
    fn test_framing_scales_with_radius() {
        let mut small = composer(800, 600);
        let mut large = composer(800, 600);
        small.frame(BoundingSphere::new(Vec3::ZERO, 1.0));
        large.frame(BoundingSphere::new(Vec3::ZERO, 3.0));

        let d_small = small.state().camera.position.length();
        let d_large = large.state().camera.position.length();
        assert!((d_large / d_small - 3.0).abs() < 1e-4);
        assert!((large.state().ground.half_extent - 3.0 * 3.0 / 1.05).abs() < 1e-4);
    }

    #[test]
    fn test_progress_stays_in_unit_range() {
        for position in [-5000.0, -1.0, 0.0, 1.0, 799.0, 800.0, 12_345.0] {
            let p = scroll_progress(position, 800.0);
            assert!((0.0..=1.0).contains(&p), "progress {p} at {position}");
        }
    }

    #[test]
    fn test_boost_quench_bound() {
        let settings = ScrollSettings::default();
        let mut coupler = ScrollCoupler::new(settings);
        coupler.on_scroll(2_000.0, 800.0);
        let initial = coupler.signal().boost;

        let n = ticks_to_quench(initial, 1e-4, settings.decay);
        for _ in 0..n {
            coupler.decay();
        }
        assert!(coupler.signal().boost < 1e-4);
    }

    #[test]
    fn test_many_scroll_events_in_one_tick_share_the_cap() {
        let mut coupler = ScrollCoupler::new(ScrollSettings::default());
        let mut position = 0.0;
        for _ in 0..50 {
            position += 60.0;
            coupler.on_scroll(position, 800.0);
        }
        assert!(coupler.signal().boost <= 0.02 + 1e-6);
    }
}
