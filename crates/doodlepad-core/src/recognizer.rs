//! Geometric shape recognition for completed strokes.
//!
//! Each candidate shape scores the stroke's point cloud independently; the
//! highest confidence wins, with ties going to the candidate listed first
//! (circle, square, triangle, line). Arrow detection runs afterwards and
//! refines a line (or no-match) result.

use crate::geometry::{self, aspect_ratio, corner_angle, point_to_segment_dist, rdp_simplify};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Fewest points a stroke needs before recognition is attempted.
pub const MIN_RECOGNITION_POINTS: usize = 5;
/// Confidence a result must exceed before a stroke is snapped to it.
pub const SNAP_CONFIDENCE: f64 = 0.7;

const MIN_CIRCLE_POINTS: usize = 10;
const MIN_TRIANGLE_POINTS: usize = 15;
/// Points generated around a canonical circle.
const CIRCLE_SEGMENTS: usize = 64;
/// Simplification tolerance for corner finding, relative to the bounding-box diagonal.
const CORNER_TOLERANCE: f64 = 0.08;
/// Start-to-end gap allowed for a closed stroke, relative to the diagonal.
const CLOSED_GAP: f64 = 0.2;
const ARROW_CONFIDENCE: f64 = 0.9;
/// Confidences closer than this are ties.
const TIE_EPSILON: f64 = 1e-9;

/// Shapes the recognizer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Line,
    Arrow,
}

/// Outcome of recognizing one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Best matching shape, or `None` if nothing matched.
    pub shape: Option<ShapeKind>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Bounding box of the recognized stroke.
    pub bounding_box: Rect,
    /// Corners found for polygonal shapes (triangle, arrow).
    vertices: Vec<Point>,
}

impl RecognitionResult {
    fn no_match(bounding_box: Rect) -> Self {
        Self {
            shape: None,
            confidence: 0.0,
            bounding_box,
            vertices: Vec::new(),
        }
    }

    /// Whether the result is confident enough to replace the hand-drawn points.
    pub fn should_snap(&self) -> bool {
        self.shape.is_some() && self.confidence > SNAP_CONFIDENCE
    }

    /// Points of the clean shape, derived from the stroke's bounding box.
    pub fn canonical_points(&self) -> Vec<Point> {
        let bounds = self.bounding_box;
        match self.shape {
            None => Vec::new(),
            Some(ShapeKind::Circle) => {
                let center = bounds.center();
                let radius = bounds.width().min(bounds.height()) / 2.0;
                (0..=CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                        Point::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        )
                    })
                    .collect()
            }
            Some(ShapeKind::Square) => vec![
                Point::new(bounds.x0, bounds.y0),
                Point::new(bounds.x1, bounds.y0),
                Point::new(bounds.x1, bounds.y1),
                Point::new(bounds.x0, bounds.y1),
                Point::new(bounds.x0, bounds.y0),
            ],
            Some(ShapeKind::Line) => {
                let center = bounds.center();
                if bounds.width() >= bounds.height() {
                    vec![Point::new(bounds.x0, center.y), Point::new(bounds.x1, center.y)]
                } else {
                    vec![Point::new(center.x, bounds.y0), Point::new(center.x, bounds.y1)]
                }
            }
            Some(ShapeKind::Triangle) => {
                let mut points = self.vertices.clone();
                if let Some(&first) = points.first() {
                    points.push(first);
                }
                points
            }
            Some(ShapeKind::Arrow) => self.vertices.clone(),
        }
    }
}

/// Classifies strokes as simple geometric shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeRecognizer;

impl ShapeRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Recognize the shape drawn by an ordered point sequence.
    pub fn recognize(&self, points: &[Point]) -> RecognitionResult {
        let Some(bounds) = geometry::bounding_box(points.iter().copied()) else {
            return RecognitionResult::no_match(Rect::ZERO);
        };
        if points.len() < MIN_RECOGNITION_POINTS {
            return RecognitionResult::no_match(bounds);
        }
        // A stationary tap has no shape.
        if bounds.width() <= f64::EPSILON && bounds.height() <= f64::EPSILON {
            return RecognitionResult::no_match(bounds);
        }

        let triangle = self.triangle(points, bounds);
        let (triangle_confidence, triangle_vertices) = match triangle {
            Some((confidence, vertices)) => (confidence, vertices.to_vec()),
            None => (0.0, Vec::new()),
        };

        let candidates = [
            (ShapeKind::Circle, self.circle_confidence(points, bounds)),
            (ShapeKind::Square, self.square_confidence(points, bounds)),
            (ShapeKind::Triangle, triangle_confidence),
            (ShapeKind::Line, self.line_confidence(points, bounds)),
        ];

        let mut best = (None, 0.0);
        for (kind, confidence) in candidates {
            if confidence > best.1 + TIE_EPSILON {
                best = (Some(kind), confidence);
            }
        }

        let mut result = RecognitionResult {
            shape: best.0,
            confidence: best.1,
            bounding_box: bounds,
            vertices: Vec::new(),
        };
        if result.shape == Some(ShapeKind::Triangle) {
            result.vertices = triangle_vertices;
        }

        if matches!(result.shape, None | Some(ShapeKind::Line)) {
            if let Some(vertices) = self.arrow(points, bounds) {
                result.shape = Some(ShapeKind::Arrow);
                result.confidence = ARROW_CONFIDENCE;
                result.vertices = vertices.to_vec();
            }
        }

        log::debug!(
            "Recognized {:?} with confidence {:.2} over {} points",
            result.shape,
            result.confidence,
            points.len()
        );
        result
    }

    /// Mean deviation from the radius implied by the bounding box.
    pub fn circle_confidence(&self, points: &[Point], bounds: Rect) -> f64 {
        if points.len() < MIN_CIRCLE_POINTS {
            return 0.0;
        }
        let center = bounds.center();
        let expected_radius = bounds.width().min(bounds.height()) / 2.0;
        if expected_radius <= f64::EPSILON {
            return 0.0;
        }

        let total: f64 = points
            .iter()
            .map(|p| (p.distance(center) - expected_radius).abs())
            .sum();
        let avg_deviation = total / points.len() as f64;

        (1.0 - avg_deviation / (expected_radius * 0.2)).max(0.0)
    }

    /// Fraction of points hugging the bounding-box edges of a near-square box.
    pub fn square_confidence(&self, points: &[Point], bounds: Rect) -> f64 {
        if points.is_empty() || bounds.height() <= f64::EPSILON {
            return 0.0;
        }
        let ratio = bounds.width() / bounds.height();
        if !(0.8..=1.2).contains(&ratio) {
            return 0.0;
        }

        let tolerance = bounds.width().min(bounds.height()) * 0.1;
        let near_edge = points
            .iter()
            .filter(|p| {
                (p.x - bounds.x0).abs() < tolerance
                    || (p.x - bounds.x1).abs() < tolerance
                    || (p.y - bounds.y0).abs() < tolerance
                    || (p.y - bounds.y1).abs() < tolerance
            })
            .count();
        let edge_fraction = near_edge as f64 / points.len() as f64;

        (edge_fraction / 0.6).min(1.0)
    }

    /// Fraction of consecutive segment pairs that keep going in the same direction.
    ///
    /// Zero-length segments (repeated samples) have no direction and are skipped.
    pub fn line_confidence(&self, points: &[Point], bounds: Rect) -> f64 {
        if points.len() < 3 || aspect_ratio(bounds) < 3.0 {
            return 0.0;
        }

        let directions: Vec<f64> = points
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|step| step.hypot() > f64::EPSILON)
            .map(|step| step.atan2())
            .collect();
        if directions.len() < 2 {
            return 0.0;
        }

        let straight = directions
            .windows(2)
            .filter(|d| angle_between(d[0], d[1]) < 0.2)
            .count();
        let linear_fraction = straight as f64 / (directions.len() - 1) as f64;

        (linear_fraction / 0.7).min(1.0)
    }

    /// Confidence that the stroke is a triangle.
    pub fn triangle_confidence(&self, points: &[Point], bounds: Rect) -> f64 {
        self.triangle(points, bounds).map_or(0.0, |(confidence, _)| confidence)
    }

    /// Closed stroke whose simplified outline has exactly three corners.
    fn triangle(&self, points: &[Point], bounds: Rect) -> Option<(f64, [Point; 3])> {
        if points.len() < MIN_TRIANGLE_POINTS {
            return None;
        }
        let diagonal = bounds.width().hypot(bounds.height());
        if diagonal <= f64::EPSILON {
            return None;
        }
        let (first, last) = (points[0], points[points.len() - 1]);
        if first.distance(last) > diagonal * CLOSED_GAP {
            return None;
        }

        let corners = closed_outline(points, diagonal * CORNER_TOLERANCE);
        let [a, b, c] = corners[..] else {
            return None;
        };
        let angles = [corner_angle(c, a, b), corner_angle(a, b, c), corner_angle(b, c, a)];
        let (min_angle, max_angle) = (20f64.to_radians(), 150f64.to_radians());
        if angles.iter().any(|angle| *angle < min_angle || *angle > max_angle) {
            return None;
        }

        let tolerance = bounds.width().min(bounds.height()) * 0.1;
        let on_edge = points
            .iter()
            .filter(|p| {
                point_to_segment_dist(**p, a, b) < tolerance
                    || point_to_segment_dist(**p, b, c) < tolerance
                    || point_to_segment_dist(**p, c, a) < tolerance
            })
            .count();
        let edge_fraction = on_edge as f64 / points.len() as f64;

        Some(((edge_fraction / 0.8).min(1.0), [a, b, c]))
    }

    /// Shaft followed by two barbs drawn back from its tip.
    fn arrow(&self, points: &[Point], bounds: Rect) -> Option<[Point; 5]> {
        let diagonal = bounds.width().hypot(bounds.height());
        if diagonal <= f64::EPSILON {
            return None;
        }
        let outline = rdp_simplify(points, diagonal * CORNER_TOLERANCE);
        let [tail, tip, barb_a, tip_again, barb_b] = outline[..] else {
            return None;
        };

        let shaft = tail.distance(tip);
        if shaft <= f64::EPSILON {
            return None;
        }
        let segments = [
            shaft,
            tip.distance(barb_a),
            barb_a.distance(tip_again),
            tip_again.distance(barb_b),
        ];
        if segments[1..].iter().any(|len| *len > shaft) {
            return None;
        }
        if tip.distance(tip_again) > shaft * 0.2 {
            return None;
        }

        let back = (tail - tip).atan2();
        let (min_angle, max_angle) = (15f64.to_radians(), 75f64.to_radians());
        for (from, barb) in [(tip, barb_a), (tip_again, barb_b)] {
            let length = from.distance(barb) / shaft;
            if !(0.1..=0.6).contains(&length) {
                return None;
            }
            let spread = angle_between(back, (barb - from).atan2());
            if spread < min_angle || spread > max_angle {
                return None;
            }
        }

        Some([tail, tip, barb_a, tip, barb_b])
    }
}

/// Absolute difference between two directions, in `[0, PI]`.
fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (b - a).rem_euclid(TAU);
    if diff > std::f64::consts::PI {
        TAU - diff
    } else {
        diff
    }
}

/// Corners of a closed stroke, with near-straight vertices dropped.
fn closed_outline(points: &[Point], tolerance: f64) -> Vec<Point> {
    // Split at the point farthest from the start so each half is an open polyline.
    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.distance(start).total_cmp(&b.distance(start)))
        .map_or(0, |(i, _)| i);
    if far == 0 {
        return Vec::new();
    }

    let mut outline = rdp_simplify(&points[..=far], tolerance);
    outline.pop();
    outline.extend(rdp_simplify(&points[far..], tolerance));
    // Start and end coincide on a closed stroke.
    outline.pop();

    let straight = 160f64.to_radians();
    loop {
        let n = outline.len();
        if n <= 3 {
            break;
        }
        let flattest = (0..n)
            .map(|i| {
                let prev = outline[(i + n - 1) % n];
                let next = outline[(i + 1) % n];
                (i, corner_angle(prev, outline[i], next))
            })
            .filter(|(_, angle)| *angle > straight)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match flattest {
            Some((i, _)) => {
                outline.remove(i);
            }
            None => break,
        }
    }
    outline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_points(center: Point, radius: f64, count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let angle = TAU * i as f64 / count as f64;
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect()
    }

    /// Points along a polyline, `steps` per segment, ending on the last vertex.
    fn trace(vertices: &[Point], steps: usize) -> Vec<Point> {
        let mut points = Vec::new();
        for w in vertices.windows(2) {
            for k in 0..steps {
                points.push(w[0].lerp(w[1], k as f64 / steps as f64));
            }
        }
        if let Some(&last) = vertices.last() {
            points.push(last);
        }
        points
    }

    #[test]
    fn test_circle_recognized() {
        let points = circle_points(Point::new(100.0, 100.0), 50.0, 64);
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, Some(ShapeKind::Circle));
        assert!(result.confidence > 0.95);
        assert!(result.should_snap());
    }

    #[test]
    fn test_circle_needs_ten_points() {
        let points = circle_points(Point::new(0.0, 0.0), 50.0, 9);
        let bounds = geometry::bounding_box(points.iter().copied()).unwrap();
        assert_eq!(ShapeRecognizer::new().circle_confidence(&points, bounds), 0.0);
    }

    #[test]
    fn test_too_few_points_is_no_match() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, None);
        assert_eq!(result.confidence, 0.0);
        assert!(result.canonical_points().is_empty());
    }

    #[test]
    fn test_square_rejects_wide_box() {
        let points = trace(
            &[
                Point::new(0.0, 0.0),
                Point::new(200.0, 0.0),
                Point::new(200.0, 50.0),
                Point::new(0.0, 50.0),
                Point::new(0.0, 0.0),
            ],
            10,
        );
        let bounds = Rect::new(0.0, 0.0, 200.0, 50.0);
        assert_eq!(ShapeRecognizer::new().square_confidence(&points, bounds), 0.0);
    }

    #[test]
    fn test_square_recognized() {
        let points = trace(
            &[
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
                Point::new(0.0, 0.0),
            ],
            10,
        );
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, Some(ShapeKind::Square));
        assert!((result.confidence - 1.0).abs() < 1e-9);

        let canonical = result.canonical_points();
        assert_eq!(canonical.len(), 5);
        assert_eq!(canonical.first(), canonical.last());
    }

    #[test]
    fn test_line_recognized() {
        let points: Vec<Point> = (0..20)
            .map(|i| Point::new(i as f64 * 10.0, 50.0 + (i % 2) as f64 * 0.5))
            .collect();
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, Some(ShapeKind::Line));
        assert!(result.confidence > 0.7);

        let canonical = result.canonical_points();
        assert_eq!(canonical.len(), 2);
        assert_eq!(canonical[0].x, 0.0);
        assert_eq!(canonical[1].x, 190.0);
        assert!((canonical[0].y - 50.25).abs() < 1e-9);
    }

    #[test]
    fn test_line_rejects_stubby_box() {
        let points = trace(&[Point::new(0.0, 0.0), Point::new(100.0, 50.0)], 10);
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(ShapeRecognizer::new().line_confidence(&points, bounds), 0.0);
    }

    #[test]
    fn test_triangle_recognized() {
        let vertices = [
            Point::new(0.0, 100.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let points = trace(&vertices, 10);
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, Some(ShapeKind::Triangle));
        assert!((result.confidence - 1.0).abs() < 1e-9);

        let canonical = result.canonical_points();
        assert_eq!(canonical.len(), 4);
        assert_eq!(canonical.first(), canonical.last());
        for corner in &vertices[..3] {
            assert!(canonical.contains(corner));
        }
    }

    #[test]
    fn test_triangle_started_mid_edge() {
        let vertices = [
            Point::new(50.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(50.0, 100.0),
        ];
        let points = trace(&vertices, 8);
        let bounds = geometry::bounding_box(points.iter().copied()).unwrap();
        assert!(ShapeRecognizer::new().triangle_confidence(&points, bounds) > 0.9);
    }

    #[test]
    fn test_triangle_not_matched_by_circle() {
        let points = circle_points(Point::new(100.0, 100.0), 50.0, 64);
        let bounds = geometry::bounding_box(points.iter().copied()).unwrap();
        assert_eq!(ShapeRecognizer::new().triangle_confidence(&points, bounds), 0.0);
    }

    #[test]
    fn test_arrow_refines_line() {
        let tail = Point::new(0.0, 50.0);
        let tip = Point::new(200.0, 50.0);
        let barb_a = Point::new(170.0, 30.0);
        let barb_b = Point::new(170.0, 70.0);

        let mut points = trace(&[tail, tip], 20);
        points.pop();
        points.extend(trace(&[tip, barb_a, tip, barb_b], 5));

        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, Some(ShapeKind::Arrow));
        assert_eq!(result.canonical_points(), vec![tail, tip, barb_a, tip, barb_b]);
    }

    #[test]
    fn test_scribble_has_no_confident_match() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 40.0),
            Point::new(40.0, 0.0),
            Point::new(60.0, 40.0),
            Point::new(80.0, 0.0),
            Point::new(100.0, 40.0),
        ];
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, None);
        assert!(!result.should_snap());
    }

    #[test]
    fn test_stationary_tap_is_no_match() {
        let points = vec![Point::new(40.0, 40.0); 6];
        let result = ShapeRecognizer::new().recognize(&points);
        assert_eq!(result.shape, None);
        assert!(!result.should_snap());
        assert!(result.canonical_points().is_empty());
    }

    #[test]
    fn test_circle_confidence_with_radial_error() {
        // Every point sits 4 inside the radius implied by the box: 1 - 4 / (50 * 0.2).
        let points = circle_points(Point::new(100.0, 100.0), 46.0, 64);
        let bounds = Rect::new(50.0, 50.0, 150.0, 150.0);
        let confidence = ShapeRecognizer::new().circle_confidence(&points, bounds);
        assert!((confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_square_confidence_partial_edges() {
        // 3 of 10 points lie within 10 of an edge: 0.3 / 0.6.
        let mut points = vec![
            Point::new(5.0, 50.0),
            Point::new(50.0, 95.0),
            Point::new(95.0, 50.0),
        ];
        points.extend((0..7).map(|i| Point::new(30.0 + i as f64 * 5.0, 50.0)));
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let confidence = ShapeRecognizer::new().square_confidence(&points, bounds);
        assert!((confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_line_confidence_counts_turns() {
        // Segments run flat, flat, flat, flat, up, flat, up: 3 of 6 pairs are straight.
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(50.0, 5.0),
            Point::new(60.0, 5.0),
            Point::new(70.0, 10.0),
        ];
        let bounds = Rect::new(0.0, 0.0, 70.0, 10.0);
        let confidence = ShapeRecognizer::new().line_confidence(&points, bounds);
        assert!((confidence - 0.5 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_line_with_repeated_samples() {
        let points: Vec<Point> = (0..=10)
            .flat_map(|i| {
                let p = Point::new(i as f64 * 4.0, i as f64);
                [p, p]
            })
            .collect();
        let bounds = geometry::bounding_box(points.iter().copied()).unwrap();
        assert!((ShapeRecognizer::new().line_confidence(&points, bounds) - 1.0).abs() < 1e-9);
        assert_eq!(ShapeRecognizer::new().recognize(&points).shape, Some(ShapeKind::Line));
    }

    #[test]
    fn test_circle_wins_tie_with_square() {
        let points = circle_points(Point::new(100.0, 100.0), 50.0, 64);
        let bounds = geometry::bounding_box(points.iter().copied()).unwrap();
        let recognizer = ShapeRecognizer::new();
        let circle = recognizer.circle_confidence(&points, bounds);
        let square = recognizer.square_confidence(&points, bounds);
        assert!((circle - square).abs() < 1e-9);
        assert_eq!(recognizer.recognize(&points).shape, Some(ShapeKind::Circle));
    }

    #[test]
    fn test_angle_between_wraps() {
        assert!((angle_between(3.1, -3.1) - (TAU - 6.2)).abs() < 1e-9);
        assert!(angle_between(0.5, 0.5).abs() < 1e-12);
    }
}
