//! Editor thresholds and defaults.

use crate::graph::{NodeId, NodeShape};
use crate::selection::DeselectMethods;
use crate::snap::GRID_SPACING;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Every tunable value the editor reads.
///
/// Distances marked "px" are canvas pixels and get divided by the zoom
/// before they are compared against world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Edge hit-test tolerance (px).
    pub hit_tolerance: f64,
    /// Pointer travel before a press turns into a drag (px, Manhattan).
    pub drag_threshold: f64,
    /// Extra margin around group bounds for group hit-tests (px).
    pub group_border_margin: f64,
    /// Snap grid spacing in world units.
    pub grid_spacing: f64,
    pub node_size: f64,
    /// Distance between node centers in new groups.
    pub node_spacing: f64,
    /// Center of the first node of a new group.
    pub group_origin: Point,
    pub node_shape: NodeShape,
    pub node_id_start: NodeId,
    pub allow_duplicate_names: bool,
    /// Wheel delta that doubles the zoom.
    pub zoom_sensitivity: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    pub min_bridge_connections: u32,
    pub max_bridge_connections: u32,
    /// Offset applied to pasted groups.
    pub paste_offset: Vec2,
    /// Size of a bridge floating menu in world units.
    pub menu_size: Size,
    /// Gap between a floating menu and the top of its group.
    pub menu_gap: f64,
    /// Which deselection triggers start enabled.
    pub deselect: DeselectMethods,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 5.0,
            drag_threshold: 5.0,
            group_border_margin: 5.0,
            grid_spacing: GRID_SPACING,
            node_size: 30.0,
            node_spacing: 40.0,
            group_origin: Point::new(100.0, 100.0),
            node_shape: NodeShape::Rectangle,
            node_id_start: 0,
            allow_duplicate_names: true,
            zoom_sensitivity: 1200.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            default_zoom: 1.0,
            min_bridge_connections: 1,
            max_bridge_connections: 10,
            paste_offset: Vec2::new(40.0, 40.0),
            menu_size: Size::new(140.0, 60.0),
            menu_gap: 10.0,
            deselect: DeselectMethods::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration. Missing fields keep defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("grid_spacing", self.grid_spacing),
            ("node_size", self.node_size),
            ("node_spacing", self.node_spacing),
            ("zoom_sensitivity", self.zoom_sensitivity),
            ("min_zoom", self.min_zoom),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("hit_tolerance", self.hit_tolerance),
            ("drag_threshold", self.drag_threshold),
            ("group_border_margin", self.group_border_margin),
            ("menu_gap", self.menu_gap),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_bridge_connections < 1 || self.min_bridge_connections > self.max_bridge_connections {
            return Err(ConfigError::Invalid(format!(
                "bridge connection range {}..={} is empty or starts below 1",
                self.min_bridge_connections, self.max_bridge_connections
            )));
        }
        Ok(())
    }
}
