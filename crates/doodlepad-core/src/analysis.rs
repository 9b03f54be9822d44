//! Summary statistics over a finished drawing.

use crate::color::SerializableColor;
use crate::stroke::Stroke;
use crate::tools::Tool;
use kurbo::Rect;
use serde::Serialize;

/// Figures describing a set of strokes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingAnalysis {
    pub stroke_count: usize,
    pub point_count: usize,
    /// Earliest to latest point timestamp, 0 when strokes carry no timestamps.
    pub drawing_time_ms: f64,
    pub average_stroke_length: f64,
    /// Distinct colors in first-use order.
    pub colors_used: Vec<SerializableColor>,
    /// Distinct tools in first-use order.
    pub tools_used: Vec<Tool>,
    pub bounds: Option<Rect>,
}

impl DrawingAnalysis {
    pub fn from_strokes(strokes: &[Stroke]) -> Self {
        let mut colors_used = Vec::new();
        let mut tools_used = Vec::new();
        let mut bounds: Option<Rect> = None;
        let mut total_length = 0.0;
        let mut earliest: Option<f64> = None;
        let mut latest: Option<f64> = None;

        for stroke in strokes {
            if !colors_used.contains(&stroke.color) {
                colors_used.push(stroke.color);
            }
            if !tools_used.contains(&stroke.tool) {
                tools_used.push(stroke.tool);
            }
            if let Some(stroke_bounds) = stroke.bounds() {
                bounds = Some(match bounds {
                    Some(b) => b.union(stroke_bounds),
                    None => stroke_bounds,
                });
            }
            total_length += stroke.length();

            for t in stroke.points.iter().filter_map(|p| p.timestamp) {
                earliest = Some(earliest.map_or(t, |e| e.min(t)));
                latest = Some(latest.map_or(t, |l| l.max(t)));
            }
        }

        let drawing_time_ms = match (earliest, latest) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        };
        let average_stroke_length = if strokes.is_empty() {
            0.0
        } else {
            total_length / strokes.len() as f64
        };

        Self {
            stroke_count: strokes.len(),
            point_count: strokes.iter().map(Stroke::len).sum(),
            drawing_time_ms,
            average_stroke_length,
            colors_used,
            tools_used,
            bounds,
        }
    }
}
