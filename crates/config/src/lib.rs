//! Shared configuration for the surface painter
//!
//! This crate holds the defaults a painter session starts from: initial
//! brush settings, the resolution of freshly created raster canvases, and
//! undo history limits. Everything is plain serde data so hosts can keep it
//! in whatever settings store they already use.

use serde::{Deserialize, Serialize};

/// Default brush color (opaque white)
pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Default brush radius
pub const DEFAULT_RADIUS: f32 = 0.5;

/// Default blend amount per sample
pub const DEFAULT_BLEND: f32 = 0.1;

/// Edge length of a new flat raster canvas with no backing image
pub const DEFAULT_FLAT_RESOLUTION: u32 = 512;

/// Face edge length of a new cube raster canvas with no backing image
pub const DEFAULT_CUBE_RESOLUTION: u32 = 1024;

/// Initial brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    /// Paint stroke direction instead of a color
    pub directional: bool,
    pub color: [f32; 4],
    pub radius: f32,
    pub blend: f32,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            directional: false,
            color: DEFAULT_COLOR,
            radius: DEFAULT_RADIUS,
            blend: DEFAULT_BLEND,
        }
    }
}

/// Resolution used when a raster canvas has no backing image to copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub flat_resolution: u32,
    pub cube_resolution: u32,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            flat_resolution: DEFAULT_FLAT_RESOLUTION,
            cube_resolution: DEFAULT_CUBE_RESOLUTION,
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest snapshots are dropped beyond this count. None keeps everything.
    pub max_entries: Option<usize>,
}

/// Complete painter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    pub brush: BrushDefaults,
    pub canvas: CanvasDefaults,
    pub history: HistoryConfig,
}

impl PainterConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PainterConfig::default();
        assert!(!config.brush.directional);
        assert_eq!(config.brush.color, DEFAULT_COLOR);
        assert_eq!(config.brush.radius, DEFAULT_RADIUS);
        assert_eq!(config.brush.blend, DEFAULT_BLEND);
        assert_eq!(config.history.max_entries, None);
    }

    #[test]
    fn test_cube_default_larger_than_flat() {
        let canvas = CanvasDefaults::default();
        assert!(canvas.cube_resolution > canvas.flat_resolution);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PainterConfig::from_json(r#"{ "brush": { "radius": 2.0 } }"#).unwrap();
        assert_eq!(config.brush.radius, 2.0);
        assert_eq!(config.brush.blend, DEFAULT_BLEND);
        assert_eq!(config.canvas, CanvasDefaults::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = PainterConfig::default();
        config.history.max_entries = Some(32);
        let json = config.to_json().unwrap();
        assert_eq!(PainterConfig::from_json(&json).unwrap(), config);
    }
}
