//! Canvas configuration.
//!
//! [`CanvasOptions`] is what callers (or a JSON file) provide; every field is
//! optional. [`CanvasConfig::resolve`] layers built-in defaults, then the
//! age-group defaults, then the explicit options.

use crate::color::SerializableColor;
use crate::history::DEFAULT_UNDO_LIMIT;
use crate::tools::{AgeGroup, Tool, ToolSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Caller-supplied canvas options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub tool: Option<Tool>,
    pub age_group: Option<AgeGroup>,
    pub enable_pressure: Option<bool>,
    pub smoothing: Option<bool>,
    pub snap_to_shape: Option<bool>,
    pub grid_assist: Option<bool>,
    pub undo_limit: Option<usize>,
}

impl CanvasOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Fully resolved canvas configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub tool: Tool,
    pub age_group: Option<AgeGroup>,
    pub enable_pressure: bool,
    pub smoothing: bool,
    pub snap_to_shape: bool,
    pub grid_assist: bool,
    pub undo_limit: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: SerializableColor::white(),
            stroke_color: SerializableColor::black(),
            stroke_width: 5.0,
            tool: Tool::Pen,
            age_group: None,
            enable_pressure: true,
            smoothing: true,
            snap_to_shape: false,
            grid_assist: false,
            undo_limit: DEFAULT_UNDO_LIMIT,
        }
    }
}

impl CanvasConfig {
    /// Resolve options into a configuration.
    pub fn resolve(options: &CanvasOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(age_group) = options.age_group {
            let defaults = age_group.defaults();
            config.age_group = Some(age_group);
            config.stroke_width = defaults.stroke_width;
            config.smoothing = defaults.smoothing;
            config.snap_to_shape = defaults.snap_to_shape;
        }

        if let Some(width) = options.width {
            config.width = width;
        }
        if let Some(height) = options.height {
            config.height = height;
        }
        if let Some(color) = &options.background_color {
            config.background_color = parse_color("backgroundColor", color)?;
        }
        if let Some(color) = &options.stroke_color {
            config.stroke_color = parse_color("strokeColor", color)?;
        }
        if let Some(width) = options.stroke_width {
            config.stroke_width = width;
        }
        if let Some(tool) = options.tool {
            config.tool = tool;
        }
        if let Some(enable) = options.enable_pressure {
            config.enable_pressure = enable;
        }
        if let Some(smoothing) = options.smoothing {
            config.smoothing = smoothing;
        }
        if let Some(snap) = options.snap_to_shape {
            config.snap_to_shape = snap;
        }
        if let Some(grid) = options.grid_assist {
            config.grid_assist = grid;
        }
        if let Some(limit) = options.undo_limit {
            config.undo_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the canvas relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "strokeWidth must be positive, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }

    /// Tool settings a fresh canvas starts with.
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            tool: self.tool,
            color: self.stroke_color,
            width: self.stroke_width,
        }
    }
}

fn parse_color(field: &str, value: &str) -> Result<SerializableColor, ConfigError> {
    SerializableColor::parse(value).ok_or_else(|| {
        log::warn!("Rejecting {} value {:?}", field, value);
        ConfigError::Invalid(format!("{} is not a hex color: {}", field, value))
    })
}
