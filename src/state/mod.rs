//! Application state management.
//!
//! The host keeps only what the panels need between frames. Everything
//! about the map itself lives in the render engine.

pub mod url_state;

use crate::engine::EngineHandle;
use crate::geo::GeoPoint;
use crate::render::{default_markers, MarkerFeature, RingMode};
use eframe::egui::Pos2;

/// Root application state shared by the panels.
#[derive(Default)]
pub struct AppState {
    /// Application status message displayed in top bar
    pub status_message: String,

    /// Set when bootstrap failed for good
    pub failed: bool,

    /// Navigation handle, available once the map is ready
    pub handle: Option<EngineHandle>,

    /// Ring mode selected in the top bar
    pub ring_mode: RingMode,

    /// Cities offered in the "go to" list
    pub cities: Vec<MarkerFeature>,

    /// City last picked from the "go to" list
    pub selected_city: Option<String>,

    /// Last pointer position sent to the engine (canvas-local)
    pub last_pointer: Option<Pos2>,

    /// Geographic coordinate under the pointer
    pub pointer_geo: Option<GeoPoint>,

    /// Country under the pointer, by name or key
    pub pointer_country: Option<String>,

    /// Engine revision the pointer readout was computed against
    pub readout_revision: u64,
}

impl AppState {
    pub fn new(ring_mode: RingMode) -> Self {
        Self {
            status_message: "Loading map data...".to_string(),
            ring_mode,
            cities: default_markers(),
            ..Default::default()
        }
    }

    /// Whether the pointer readout must be recomputed, either because the
    /// pointer moved or because the map was redrawn underneath it.
    pub fn readout_stale(&self, pointer: Option<Pos2>, revision: u64) -> bool {
        pointer != self.last_pointer || revision != self.readout_revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn test_readout_stale_after_pointer_move() {
        let mut state = AppState::new(RingMode::Distance);
        state.last_pointer = Some(pos2(10.0, 10.0));
        state.readout_revision = 3;

        assert!(!state.readout_stale(Some(pos2(10.0, 10.0)), 3));
        assert!(state.readout_stale(Some(pos2(12.0, 10.0)), 3));
        assert!(state.readout_stale(None, 3));
    }

    #[test]
    fn test_readout_stale_after_redraw_with_still_pointer() {
        let mut state = AppState::new(RingMode::Distance);
        state.last_pointer = Some(pos2(10.0, 10.0));
        state.readout_revision = 3;

        // Navigation or a debounced resize bumps the engine revision
        assert!(state.readout_stale(Some(pos2(10.0, 10.0)), 4));
    }
}
