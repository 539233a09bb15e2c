//! Widget configuration
//!
//! Every field has a default, so an empty object (or no config at all) gives
//! the stock widget: 50 ms blocking threshold, snapshots published to
//! `window.__metrics`, panel in the bottom-right corner.

use serde::{Deserialize, Serialize};

use crate::error::VitalsError;
use crate::signal::{CapabilitySet, SignalKind};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsConfig {
    /// Long-task time beyond this counts as blocking (default: 50)
    #[serde(default = "default_long_task_threshold_ms")]
    pub long_task_threshold_ms: f64,
    /// Global property the snapshot is published under (default: `__metrics`)
    #[serde(default = "default_publish_key")]
    pub publish_key: String,
    #[serde(default)]
    pub panel: PanelConfig,
    /// Log to the browser console
    #[serde(default)]
    pub debug: bool,
    /// Recompute once after the window `load` event (default: true)
    #[serde(default = "default_true")]
    pub recompute_on_load: bool,
    /// Categories to treat as unsupported even if the host has them
    #[serde(default)]
    pub disabled_signals: Vec<SignalKind>,
}

fn default_long_task_threshold_ms() -> f64 {
    50.0
}

fn default_publish_key() -> String {
    "__metrics".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            long_task_threshold_ms: default_long_task_threshold_ms(),
            publish_key: default_publish_key(),
            panel: PanelConfig::default(),
            debug: false,
            recompute_on_load: true,
            disabled_signals: Vec::new(),
        }
    }
}

impl VitalsConfig {
    /// Parse and validate configuration from JSON
    pub fn from_json(s: &str) -> Result<Self, VitalsError> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| VitalsError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Probed host capabilities minus the disabled categories
    pub fn effective_capabilities(&self, probed: CapabilitySet) -> CapabilitySet {
        self.disabled_signals
            .iter()
            .fold(probed, |caps, kind| caps.without(*kind))
    }

    pub fn validate(&self) -> Result<(), VitalsError> {
        if !self.long_task_threshold_ms.is_finite() || self.long_task_threshold_ms < 0.0 {
            return Err(VitalsError::Config(format!(
                "longTaskThresholdMs must be a non-negative number, got {}",
                self.long_task_threshold_ms
            )));
        }
        if self.publish_key.trim().is_empty() {
            return Err(VitalsError::Config(
                "publishKey must not be empty".to_string(),
            ));
        }
        if self.panel.width_px == 0 {
            return Err(VitalsError::Config(
                "panel.widthPx must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Overlay panel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub corner: PanelCorner,
    /// Distance from the viewport edges (default: 16)
    #[serde(default = "default_offset_px")]
    pub offset_px: u32,
    /// Panel width (default: 320)
    #[serde(default = "default_width_px")]
    pub width_px: u32,
}

fn default_title() -> String {
    "Page vitals".to_string()
}

fn default_offset_px() -> u32 {
    16
}

fn default_width_px() -> u32 {
    320
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: default_title(),
            corner: PanelCorner::default(),
            offset_px: default_offset_px(),
            width_px: default_width_px(),
        }
    }
}

/// Viewport corner the panel is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PanelCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl PanelCorner {
    /// CSS properties (vertical, horizontal) to anchor on
    pub fn anchors(self) -> (&'static str, &'static str) {
        match self {
            PanelCorner::TopLeft => ("top", "left"),
            PanelCorner::TopRight => ("top", "right"),
            PanelCorner::BottomLeft => ("bottom", "left"),
            PanelCorner::BottomRight => ("bottom", "right"),
        }
    }
}
