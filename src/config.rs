//! Engine configuration.
//!
//! Defaults come from the named constants below. On native builds a JSON
//! file named by `WORLD_RINGS_CONFIG` may override them; on the web the
//! page URL may override the initial view.

use crate::geo::GeoPoint;
use crate::render::RingMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between container sizing attempts.
pub const SIZING_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Sizing attempts before bootstrap gives up.
pub const SIZING_MAX_ATTEMPTS: u32 = 20;
/// Quiescence window for coalescing resize notifications.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);
/// Padding subtracted from each side of the viewport before scaling.
pub const VIEWPORT_PADDING_PX: f32 = 20.0;

/// Environment variable naming a JSON config file (native only).
pub const CONFIG_ENV_VAR: &str = "WORLD_RINGS_CONFIG";

/// Tunables for the engine and its bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sizing_retry_delay_ms: u64,
    pub sizing_max_attempts: u32,
    pub resize_debounce_ms: u64,
    pub viewport_padding_px: f32,
    pub initial_center: GeoPoint,
    pub initial_mode: RingMode,
    /// Path (native) or URL (web) of the countries GeoJSON.
    pub dataset: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sizing_retry_delay_ms: SIZING_RETRY_DELAY.as_millis() as u64,
            sizing_max_attempts: SIZING_MAX_ATTEMPTS,
            resize_debounce_ms: RESIZE_DEBOUNCE.as_millis() as u64,
            viewport_padding_px: VIEWPORT_PADDING_PX,
            initial_center: GeoPoint::from_static(0.0, 0.0),
            initial_mode: RingMode::default(),
            dataset: "assets/countries.geojson".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn sizing_retry_delay(&self) -> Duration {
        Duration::from_millis(self.sizing_retry_delay_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Parses a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    /// Load the config file named by `WORLD_RINGS_CONFIG`, if any.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        let json = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path, e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded engine config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Defaults with the initial view taken from the page URL.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let params = crate::state::url_state::parse_from_url();
        Self::default().with_url_params(&params)
    }

    /// Applies URL overrides to the initial view. Out-of-range values are
    /// ignored with a warning.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn with_url_params(mut self, params: &crate::state::url_state::UrlParams) -> Self {
        if let (Some(lat), Some(lon)) = (params.lat, params.lon) {
            match GeoPoint::new(lon, lat) {
                Ok(center) => self.initial_center = center,
                Err(e) => log::warn!("Ignoring URL center: {}", e),
            }
        }
        if let Some(mode) = &params.mode {
            match mode.parse::<RingMode>() {
                Ok(mode) => self.initial_mode = mode,
                Err(e) => log::warn!("Ignoring URL mode: {}", e),
            }
        }
        self
    }

    /// Replaces unusable values with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.sizing_max_attempts == 0 {
            log::warn!("sizing_max_attempts must be at least 1, using default");
            self.sizing_max_attempts = defaults.sizing_max_attempts;
        }
        if !self.viewport_padding_px.is_finite() || self.viewport_padding_px < 0.0 {
            log::warn!("viewport_padding_px must be non-negative, using default");
            self.viewport_padding_px = defaults.viewport_padding_px;
        }
        if self.initial_center.validate().is_err() {
            log::warn!("initial_center is out of range, using default");
            self.initial_center = defaults.initial_center;
        }
        if self.dataset.trim().is_empty() {
            log::warn!("dataset location is empty, using default");
            self.dataset = defaults.dataset;
        }
        self
    }
}
