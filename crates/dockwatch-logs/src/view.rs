//! Autoscroll policy for the log view.

/// Distance from the bottom within which the view stays pinned.
const STICKY_MARGIN: f64 = 100.0;

/// Sticky-bottom autoscroll.
///
/// Follows new output while the viewport sits near the bottom, releases
/// when the user scrolls up to read, and re-engages once they scroll back
/// within the sticky margin.
#[derive(Debug, Clone, Copy)]
pub struct Autoscroll {
    enabled: bool,
}

impl Default for Autoscroll {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Autoscroll {
    /// Start pinned to the bottom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether new output should scroll into view.
    pub fn should_follow(&self) -> bool {
        self.enabled
    }

    /// Manual pause/resume toggle.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Update from scroll geometry: offset from the top, total content
    /// height, and viewport height.
    pub fn on_scroll(&mut self, scroll_top: f64, scroll_height: f64, client_height: f64) {
        self.enabled = scroll_height - scroll_top - client_height < STICKY_MARGIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_by_default() {
        assert!(Autoscroll::new().should_follow());
    }

    #[test]
    fn releases_when_scrolled_away_from_bottom() {
        let mut scroll = Autoscroll::new();
        scroll.on_scroll(0.0, 5000.0, 600.0);
        assert!(!scroll.should_follow());
    }

    #[test]
    fn reengages_near_the_bottom() {
        let mut scroll = Autoscroll::new();
        scroll.on_scroll(0.0, 5000.0, 600.0);
        assert!(!scroll.should_follow());
        // 5000 - 4350 - 600 = 50, inside the sticky margin.
        scroll.on_scroll(4350.0, 5000.0, 600.0);
        assert!(scroll.should_follow());
    }

    #[test]
    fn toggle_flips_the_policy() {
        let mut scroll = Autoscroll::new();
        scroll.toggle();
        assert!(!scroll.should_follow());
        scroll.toggle();
        assert!(scroll.should_follow());
    }
}
