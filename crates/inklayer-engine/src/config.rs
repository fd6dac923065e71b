//! Engine configuration.

use inklayer_core::geometry::DEFAULT_SMOOTHING_FACTOR;
use inklayer_core::scheduler::DEFAULT_THROTTLE_MS;
use inklayer_core::{DeadZone, StateOptions};
use inklayer_render::RenderConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::DrawingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Laplacian smoothing weight applied when a pen stroke is committed.
    pub smoothing_factor: f64,
    /// Eraser radius = brush size × this factor, in device pixels.
    pub eraser_radius_factor: f64,
    /// Viewport updates smaller than this are ignored.
    pub dead_zone: DeadZone,
    /// Minimum time between scheduled repaints.
    pub throttle_ms: f64,
    pub render: RenderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            eraser_radius_factor: 0.5,
            dead_zone: DeadZone::default(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            render: RenderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_smoothing_factor(mut self, factor: f64) -> Self {
        self.smoothing_factor = factor;
        self
    }

    pub fn with_eraser_radius_factor(mut self, factor: f64) -> Self {
        self.eraser_radius_factor = factor;
        self
    }

    pub fn with_dead_zone(mut self, dead_zone: DeadZone) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    pub fn with_throttle_ms(mut self, throttle_ms: f64) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }

    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub(crate) fn state_options(&self) -> StateOptions {
        StateOptions {
            smoothing_factor: self.smoothing_factor,
            eraser_radius_factor: self.eraser_radius_factor,
        }
    }
}
