//! Page scroll → normalized progress and a self-quenching spin boost

use serde::{Deserialize, Serialize};

/// Boost below this is treated as fully decayed
const BOOST_FLOOR: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Pixels of scroll that would add one unit of boost
    pub pixels_per_boost: f32,
    /// Most boost that scrolling may add between two ticks
    pub max_gain_per_tick: f32,
    /// Multiplicative boost decay applied once per tick
    pub decay: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            pixels_per_boost: 5000.0,
            max_gain_per_tick: 0.02,
            decay: 0.94,
        }
    }
}

/// Shared numeric state written by scroll events and read by the render loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSignal {
    /// Position within the reference viewport, in [0, 1]
    pub progress: f32,
    /// Transient extra spin per tick
    pub boost: f32,
}

#[derive(Debug, Clone)]
pub struct ScrollCoupler {
    settings: ScrollSettings,
    signal: ScrollSignal,
    last_position: f32,
    gained_this_tick: f32,
}

impl ScrollCoupler {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            signal: ScrollSignal::default(),
            // pages load scrolled to the top
            last_position: 0.0,
            gained_this_tick: 0.0,
        }
    }

    pub fn signal(&self) -> ScrollSignal {
        self.signal
    }

    /// Sample a new page scroll position (pixels from the top)
    pub fn on_scroll(&mut self, position: f32, viewport_height: f32) {
        let delta = (position - self.last_position).abs();
        self.last_position = position;

        let budget = (self.settings.max_gain_per_tick - self.gained_this_tick).max(0.0);
        let gain = (delta / self.settings.pixels_per_boost).min(budget);
        self.gained_this_tick += gain;
        self.signal.boost += gain;

        self.signal.progress = scroll_progress(position, viewport_height);
    }

    /// Per-tick geometric decay; also reopens the per-tick gain budget
    pub fn decay(&mut self) -> f32 {
        self.signal.boost *= self.settings.decay;
        if self.signal.boost < BOOST_FLOOR {
            self.signal.boost = 0.0;
        }
        self.gained_this_tick = 0.0;
        self.signal.boost
    }
}

/// Scroll position folded into one viewport height, normalized to [0, 1]
pub fn scroll_progress(position: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    (position.rem_euclid(viewport_height) / viewport_height).clamp(0.0, 1.0)
}

/// Ticks until a boost of `initial` decays strictly below `threshold` with no input
///
/// `u32::MAX` when `decay` never shrinks the boost.
pub fn ticks_to_quench(initial: f32, threshold: f32, decay: f32) -> u32 {
    if initial < threshold || threshold <= 0.0 {
        return 0;
    }
    if decay >= 1.0 {
        return u32::MAX;
    }
    // smallest n with initial * decay^n < threshold
    ((threshold / initial).ln() / decay.ln()).floor() as u32 + 1
}

/// Winit has no page to scroll, so wheel input moves a virtual one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualPage {
    position: f32,
    viewport_height: f32,
    /// Page length in viewport heights
    pages: f32,
}

impl VirtualPage {
    /// Pixels moved per wheel line
    pub const LINE_HEIGHT: f32 = 40.0;

    pub fn new(viewport_height: f32, pages: f32) -> Self {
        Self {
            position: 0.0,
            viewport_height,
            pages: pages.max(1.0),
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn max_position(&self) -> f32 {
        self.viewport_height * (self.pages - 1.0)
    }

    /// Move by `delta` pixels (positive scrolls down); returns the new position
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.position = (self.position + delta).clamp(0.0, self.max_position());
        self.position
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        if height > 0.0 {
            self.viewport_height = height;
            self.position = self.position.min(self.max_position());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_page_clamps_to_length() {
        let mut page = VirtualPage::new(600.0, 4.0);
        assert_eq!(page.scroll_by(-100.0), 0.0);
        assert_eq!(page.scroll_by(VirtualPage::LINE_HEIGHT * 3.0), 120.0);
        assert_eq!(page.scroll_by(10_000.0), 1800.0);

        page.set_viewport_height(300.0);
        assert_eq!(page.position(), 900.0);
    }

    #[test]
    fn test_progress_folds_by_viewport() {
        assert_eq!(scroll_progress(0.0, 800.0), 0.0);
        assert_eq!(scroll_progress(400.0, 800.0), 0.5);
        assert_eq!(scroll_progress(1000.0, 800.0), 0.25);
    }

    #[test]
    fn test_progress_degenerate_viewport() {
        assert_eq!(scroll_progress(300.0, 0.0), 0.0);
        assert_eq!(scroll_progress(f32::NAN, 800.0), 0.0);
    }

    #[test]
    fn test_negative_position_uses_euclidean_modulo() {
        let p = scroll_progress(-200.0, 800.0);
        assert!((p - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_small_scroll_adds_proportional_boost() {
        let mut coupler = ScrollCoupler::new(ScrollSettings::default());
        coupler.on_scroll(50.0, 800.0);
        assert!((coupler.signal().boost - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_gain_budget_resets_after_decay() {
        let mut coupler = ScrollCoupler::new(ScrollSettings::default());
        coupler.on_scroll(5000.0, 800.0);
        coupler.on_scroll(0.0, 800.0);
        assert!((coupler.signal().boost - 0.02).abs() < 1e-6);

        coupler.decay();
        coupler.on_scroll(5000.0, 800.0);
        assert!((coupler.signal().boost - (0.02 * 0.94 + 0.02)).abs() < 1e-6);
    }

    #[test]
    fn test_decay_snaps_to_zero() {
        let mut coupler = ScrollCoupler::new(ScrollSettings::default());
        coupler.on_scroll(1.0, 800.0);
        for _ in 0..400 {
            coupler.decay();
        }
        assert_eq!(coupler.signal().boost, 0.0);
    }

    #[test]
    fn test_ticks_to_quench_bound() {
        assert_eq!(ticks_to_quench(0.02, 0.03, 0.94), 0);
        // 0.94^n < 0.5  =>  n >= 11.2
        assert_eq!(ticks_to_quench(1.0, 0.5, 0.94), 12);
        assert_eq!(ticks_to_quench(0.02, 0.02, 0.94), 1);
        assert_eq!(ticks_to_quench(0.02, 0.01, 1.0), u32::MAX);
    }

    #[test]
    fn test_ticks_to_quench_lands_under_threshold() {
        for initial in [0.02f32, 0.0123, 0.01, 1e-4] {
            for threshold in [1e-2f32, 1e-3, 1e-4, 1e-5] {
                let n = ticks_to_quench(initial, threshold, 0.94);
                let mut boost = initial;
                for _ in 0..n {
                    boost *= 0.94;
                }
                if initial >= threshold {
                    assert!(n >= 1);
                }
                assert!(boost < threshold || initial < threshold, "{initial} -> {boost} after {n}");
            }
        }
    }
}
