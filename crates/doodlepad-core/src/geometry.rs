//! Small geometry helpers shared by the recognizer and analysis.

use kurbo::{Point, Rect, Vec2};

/// Bounding box of a point set, or `None` if it is empty.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;

    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;

    for point in iter {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(Rect::new(min_x, min_y, max_x, max_y))
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Calculate perpendicular distance from point to the infinite line through two points.
fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let d = line_end - line_start;
    let line_len_sq = d.hypot2();
    if line_len_sq < f64::EPSILON {
        // Line is a point
        return point.distance(line_start);
    }

    // Area of triangle * 2 / base = height
    let area2 = (point - line_start).cross(d).abs();
    area2 / line_len_sq.sqrt()
}

/// Ramer-Douglas-Peucker line simplification.
pub fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find point with maximum distance from line between first and last
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = if first.distance(last) < f64::EPSILON {
            point.distance(first)
        } else {
            perpendicular_distance(*point, first, last)
        };
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);

        // Combine, removing duplicate point at junction
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Interior angle at `vertex` between the rays towards `a` and `b`, in radians.
pub fn corner_angle(a: Point, vertex: Point, b: Point) -> f64 {
    let u: Vec2 = a - vertex;
    let v: Vec2 = b - vertex;
    let denom = u.hypot() * v.hypot();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (u.dot(v) / denom).clamp(-1.0, 1.0).acos()
}

/// Ratio of the longer side of a rectangle to the shorter one.
///
/// A rectangle with exactly one zero side reports infinity; a point reports 1.
pub fn aspect_ratio(rect: Rect) -> f64 {
    let (w, h) = (rect.width(), rect.height());
    let (short, long) = (w.min(h), w.max(h));
    if long <= f64::EPSILON {
        return 1.0;
    }
    if short <= f64::EPSILON {
        return f64::INFINITY;
    }
    long / short
}
