//! Stroke model: recorded points and the strokes built from them.

use crate::color::SerializableColor;
use crate::geometry;
use crate::tools::{Tool, ToolSettings};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pressure reported for input devices without pressure sensing.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// A single sampled input point in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// Milliseconds, as reported by the input source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

fn default_pressure() -> f64 {
    DEFAULT_PRESSURE
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: DEFAULT_PRESSURE,
            timestamp: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for StrokePoint {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// A stroke drawn with a single tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    pub points: Vec<StrokePoint>,
    pub color: SerializableColor,
    pub width: f64,
    pub tool: Tool,
    #[serde(default)]
    pub completed: bool,
}

impl Stroke {
    /// Start a new stroke at `start` with the given tool settings.
    pub fn begin(start: StrokePoint, settings: &ToolSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            color: settings.color,
            width: settings.stroke_width(),
            tool: settings.tool,
            completed: false,
        }
    }

    /// Create a completed stroke from existing points.
    pub fn from_points(points: Vec<StrokePoint>, settings: &ToolSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color: settings.color,
            width: settings.stroke_width(),
            tool: settings.tool,
            completed: true,
        }
    }

    /// Add a point to the stroke.
    pub fn add_point(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point positions, for geometry.
    pub fn positions(&self) -> Vec<Point> {
        self.points.iter().map(StrokePoint::position).collect()
    }

    pub fn bounds(&self) -> Option<Rect> {
        geometry::bounding_box(self.points.iter().map(StrokePoint::position))
    }

    /// Length of the stroke along its points.
    pub fn length(&self) -> f64 {
        geometry::polyline_length(&self.positions())
    }

    /// Average pressure over the stroke.
    pub fn mean_pressure(&self) -> f64 {
        if self.points.is_empty() {
            return DEFAULT_PRESSURE;
        }
        self.points.iter().map(|p| p.pressure).sum::<f64>() / self.points.len() as f64
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.points.iter().find_map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.timestamp)
    }
}

/// Errors reading or writing the stroke interchange format.
#[derive(Debug, Error)]
pub enum StrokeFormatError {
    #[error("Invalid stroke JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stroke {0} has no points")]
    EmptyStroke(StrokeId),
}

/// Serialize a stroke list to JSON.
pub fn strokes_to_json(strokes: &[Stroke]) -> Result<String, StrokeFormatError> {
    Ok(serde_json::to_string_pretty(strokes)?)
}

/// Deserialize a stroke list from JSON.
pub fn strokes_from_json(json: &str) -> Result<Vec<Stroke>, StrokeFormatError> {
    let strokes: Vec<Stroke> = serde_json::from_str(json)?;
    if let Some(empty) = strokes.iter().find(|s| s.is_empty()) {
        return Err(StrokeFormatError::EmptyStroke(empty.id));
    }
    Ok(strokes)
}
