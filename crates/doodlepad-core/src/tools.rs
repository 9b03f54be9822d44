//! Drawing tools and per-session tool settings.

use crate::color::SerializableColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Highlighter,
    Crayon,
    Brush,
}

impl Tool {
    /// All tools, in toolbar order.
    pub const ALL: [Tool; 5] = [
        Tool::Pen,
        Tool::Eraser,
        Tool::Highlighter,
        Tool::Crayon,
        Tool::Brush,
    ];

    /// Multiplier applied to the configured width when a stroke starts.
    pub fn width_factor(self) -> f64 {
        match self {
            Tool::Pen => 1.0,
            Tool::Brush => 1.5,
            Tool::Crayon => 1.25,
            Tool::Highlighter => 2.5,
            Tool::Eraser => 3.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
            Tool::Highlighter => "highlighter",
            Tool::Crayon => "crayon",
            Tool::Brush => "brush",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tool: {}", s))
    }
}

/// Age group of the child using the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "3-5")]
    Preschool,
    #[serde(rename = "6-8")]
    EarlyReader,
    #[serde(rename = "9+")]
    Older,
}

/// Input defaults implied by an age group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeDefaults {
    pub stroke_width: f64,
    pub smoothing: bool,
    pub snap_to_shape: bool,
}

impl AgeGroup {
    /// Defaults applied once, when the canvas configuration is resolved.
    pub fn defaults(self) -> AgeDefaults {
        match self {
            // Small hands: thick lines, steadied strokes, shapes tidied up.
            AgeGroup::Preschool => AgeDefaults {
                stroke_width: 12.0,
                smoothing: true,
                snap_to_shape: true,
            },
            AgeGroup::EarlyReader => AgeDefaults {
                stroke_width: 8.0,
                smoothing: true,
                snap_to_shape: false,
            },
            AgeGroup::Older => AgeDefaults {
                stroke_width: 5.0,
                smoothing: false,
                snap_to_shape: false,
            },
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            AgeGroup::Preschool => "3-5",
            AgeGroup::EarlyReader => "6-8",
            AgeGroup::Older => "9+",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3-5" => Ok(AgeGroup::Preschool),
            "6-8" => Ok(AgeGroup::EarlyReader),
            "9+" => Ok(AgeGroup::Older),
            other => Err(format!("unknown age group: {}", other)),
        }
    }
}

/// Tool, color and width used for the next stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: SerializableColor,
    pub width: f64,
}

impl ToolSettings {
    /// Width a new stroke gets with the current tool.
    pub fn stroke_width(&self) -> f64 {
        self.width * self.tool.width_factor()
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: SerializableColor::black(),
            width: 5.0,
        }
    }
}
