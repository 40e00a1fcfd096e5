//! HUD presentation boundary.
//!
//! A value snapshot of everything the overlay renders, captured once per
//! displayed frame. The snapshot serializes to JSON so out-of-process
//! overlays (web views, remote dashboards) can consume the same data.

use serde::Serialize;

use crate::game::store::{GameStore, Phase};

/// What the overlay shows for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: Phase,
    /// Elapsed race time in milliseconds (zero while ready, frozen when ended).
    pub elapsed_ms: f64,
    pub blocks_count: u32,
    pub block_seed: u64,
}

impl HudSnapshot {
    /// Capture the presentation state at `now_ms` on the simulation clock.
    pub fn capture(store: &GameStore, now_ms: f64) -> Self {
        Self {
            phase: store.phase(),
            elapsed_ms: store.elapsed_ms(now_ms),
            blocks_count: store.blocks_count(),
            block_seed: store.block_seed(),
        }
    }

    /// The timer readout: seconds with two decimals.
    pub fn timer_text(&self) -> String {
        format!("{:.2}", self.elapsed_ms / 1000.0)
    }

    /// Whether the restart affordance is visible.
    pub fn show_restart(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_formats_seconds_with_two_decimals() {
        let mut store = GameStore::new(10, 1);
        assert_eq!(HudSnapshot::capture(&store, 500.0).timer_text(), "0.00");

        store.start(1000.0);
        assert_eq!(HudSnapshot::capture(&store, 2234.0).timer_text(), "1.23");

        store.end(13570.0);
        // Frozen at the final time no matter when it is captured.
        assert_eq!(HudSnapshot::capture(&store, 99999.0).timer_text(), "12.57");
    }

    #[test]
    fn restart_shows_only_when_ended() {
        let mut store = GameStore::new(10, 1);
        assert!(!HudSnapshot::capture(&store, 0.0).show_restart());

        store.start(0.0);
        assert!(!HudSnapshot::capture(&store, 1.0).show_restart());

        store.end(2.0);
        assert!(HudSnapshot::capture(&store, 3.0).show_restart());
    }

    #[test]
    fn serializes_for_external_overlays() {
        let store = GameStore::new(5, 1);
        let json = HudSnapshot::capture(&store, 0.0).to_json().unwrap();
        assert!(json.contains("\"phase\":\"ready\""));
        assert!(json.contains("\"blocks_count\":5"));
    }
}
