//! Stroke recording state machine.
//!
//! The recorder is `Idle` while [`CanvasState::current_stroke`] is `None` and
//! `Drawing` otherwise:
//!
//! - `Idle → Drawing` on pointer-down: snapshot for undo, start a stroke.
//! - `Drawing → Drawing` on move: append, smoothing the last settled point.
//! - `Drawing → Idle` on up/leave: complete, optionally snap, commit.
//! - `Drawing → Idle` on cancel: discard the stroke.

use crate::color::SerializableColor;
use crate::config::CanvasConfig;
use crate::history::History;
use crate::input::{NormalizedEvent, PointerPhase};
use crate::recognizer::{MIN_RECOGNITION_POINTS, RecognitionResult, ShapeRecognizer};
use crate::stroke::{Stroke, StrokePoint};
use crate::tools::{Tool, ToolSettings};

/// Strokes, history and the in-progress stroke of one canvas.
#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    strokes: Vec<Stroke>,
    history: History,
    current_stroke: Option<Stroke>,
    settings: ToolSettings,
}

impl CanvasState {
    pub fn new(settings: ToolSettings, undo_limit: usize) -> Self {
        Self {
            strokes: Vec::new(),
            history: History::new(undo_limit),
            current_stroke: None,
            settings,
        }
    }

    /// Committed strokes in draw order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current_stroke.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.current_stroke.is_some()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn tool(&self) -> Tool {
        self.settings.tool
    }

    pub fn color(&self) -> SerializableColor {
        self.settings.color
    }

    pub fn width(&self) -> f64 {
        self.settings.width
    }
}

/// Input behavior that shapes recorded strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderOptions {
    pub smoothing: bool,
    pub snap_to_shape: bool,
}

impl From<&CanvasConfig> for RecorderOptions {
    fn from(config: &CanvasConfig) -> Self {
        Self {
            smoothing: config.smoothing,
            snap_to_shape: config.snap_to_shape,
        }
    }
}

/// A stroke that was just committed.
#[derive(Debug, Clone)]
pub struct CommittedStroke {
    pub stroke: Stroke,
    /// Set when shape recognition ran on the stroke.
    pub recognition: Option<RecognitionResult>,
    /// Whether the stroke's points were replaced by a recognized shape.
    pub snapped: bool,
}

/// What an input event did to the canvas.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// The event had no effect.
    Ignored,
    Started,
    Extended,
    Committed(CommittedStroke),
    Cancelled,
}

/// Records strokes from normalized input into a [`CanvasState`].
#[derive(Debug, Clone)]
pub struct StrokeRecorder {
    state: CanvasState,
    options: RecorderOptions,
    recognizer: ShapeRecognizer,
}

impl StrokeRecorder {
    pub fn new(settings: ToolSettings, options: RecorderOptions, undo_limit: usize) -> Self {
        Self {
            state: CanvasState::new(settings, undo_limit),
            options,
            recognizer: ShapeRecognizer::new(),
        }
    }

    /// Build a recorder from a resolved configuration.
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.tool_settings(), config.into(), config.undo_limit)
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn options(&self) -> RecorderOptions {
        self.options
    }

    /// Apply a normalized input event.
    pub fn handle(&mut self, event: &NormalizedEvent) -> RecordOutcome {
        match event.phase {
            PointerPhase::Down => {
                if self.begin(event.point) {
                    RecordOutcome::Started
                } else {
                    RecordOutcome::Ignored
                }
            }
            PointerPhase::Move => {
                if self.update(event.point) {
                    RecordOutcome::Extended
                } else {
                    RecordOutcome::Ignored
                }
            }
            PointerPhase::Up | PointerPhase::Leave => match self.end() {
                Some(committed) => RecordOutcome::Committed(committed),
                None => RecordOutcome::Ignored,
            },
            PointerPhase::Cancel => match self.cancel() {
                Some(_) => RecordOutcome::Cancelled,
                None => RecordOutcome::Ignored,
            },
        }
    }

    /// Start a stroke. Returns false if one is already in progress.
    pub fn begin(&mut self, point: StrokePoint) -> bool {
        if self.state.is_drawing() {
            return false;
        }

        self.state.history.push(&self.state.strokes);
        let stroke = Stroke::begin(point, &self.state.settings);
        log::debug!(
            "Stroke {} started with {} at ({:.1}, {:.1})",
            stroke.id,
            stroke.tool,
            point.x,
            point.y
        );
        self.state.current_stroke = Some(stroke);
        true
    }

    /// Append a point to the active stroke. Returns false when idle.
    pub fn update(&mut self, point: StrokePoint) -> bool {
        let smoothing = self.options.smoothing;
        let Some(stroke) = self.state.current_stroke.as_mut() else {
            return false;
        };

        stroke.add_point(point);
        if smoothing {
            smooth_last_settled(&mut stroke.points);
        }
        true
    }

    /// Complete and commit the active stroke.
    pub fn end(&mut self) -> Option<CommittedStroke> {
        let mut stroke = self.state.current_stroke.take()?;
        stroke.completed = true;

        let mut recognition = None;
        let mut snapped = false;
        if self.options.snap_to_shape
            && stroke.tool != Tool::Eraser
            && stroke.len() >= MIN_RECOGNITION_POINTS
        {
            let result = self.recognizer.recognize(&stroke.positions());
            if result.should_snap() {
                snap_to_shape(&mut stroke, &result);
                snapped = true;
                log::info!(
                    "Stroke {} snapped to {:?} ({:.2})",
                    stroke.id,
                    result.shape,
                    result.confidence
                );
            }
            recognition = Some(result);
        }

        log::debug!("Stroke {} committed with {} points", stroke.id, stroke.len());
        self.state.strokes.push(stroke.clone());
        Some(CommittedStroke {
            stroke,
            recognition,
            snapped,
        })
    }

    /// Drop the active stroke without committing it.
    ///
    /// The undo snapshot taken when the stroke began is kept.
    pub fn cancel(&mut self) -> Option<Stroke> {
        let stroke = self.state.current_stroke.take()?;
        log::debug!("Stroke {} cancelled", stroke.id);
        Some(stroke)
    }

    /// Restore the previous stroke list. No-op while drawing.
    pub fn undo(&mut self) -> bool {
        if self.state.is_drawing() {
            return false;
        }
        match self.state.history.undo(&self.state.strokes) {
            Some(strokes) => {
                self.state.strokes = strokes;
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone stroke list. No-op while drawing.
    pub fn redo(&mut self) -> bool {
        if self.state.is_drawing() {
            return false;
        }
        match self.state.history.redo(&self.state.strokes) {
            Some(strokes) => {
                self.state.strokes = strokes;
                true
            }
            None => false,
        }
    }

    /// Remove every stroke, keeping an undo point.
    pub fn clear(&mut self) {
        self.cancel();
        self.state.history.push(&self.state.strokes);
        self.state.strokes.clear();
    }

    /// Replace the stroke list, keeping an undo point.
    pub fn import(&mut self, strokes: Vec<Stroke>) {
        self.cancel();
        self.state.history.push(&self.state.strokes);
        self.state.strokes = strokes
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|mut s| {
                s.completed = true;
                s
            })
            .collect();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.state.settings.tool = tool;
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.state.settings.color = color;
    }

    /// Set the base width. Non-positive or non-finite widths are ignored.
    pub fn set_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width <= 0.0 {
            return false;
        }
        self.state.settings.width = width;
        true
    }
}

/// Low-pass the second-to-last point: `(p[i-2] + 2 p[i-1] + p[i]) / 4`.
fn smooth_last_settled(points: &mut [StrokePoint]) {
    let n = points.len();
    if n < 3 {
        return;
    }
    let (a, c) = (points[n - 3], points[n - 1]);
    let b = &mut points[n - 2];
    b.x = (a.x + 2.0 * b.x + c.x) / 4.0;
    b.y = (a.y + 2.0 * b.y + c.y) / 4.0;
}

/// Replace the stroke's points with the recognized shape's canonical points.
fn snap_to_shape(stroke: &mut Stroke, result: &RecognitionResult) {
    let canonical = result.canonical_points();
    if canonical.is_empty() {
        return;
    }
    let pressure = stroke.mean_pressure();
    let timestamp = stroke.first_timestamp();
    stroke.points = canonical
        .into_iter()
        .map(|p| StrokePoint {
            x: p.x,
            y: p.y,
            pressure,
            timestamp,
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSource;
    use crate::recognizer::ShapeKind;
    use std::f64::consts::TAU;

    fn recorder(smoothing: bool, snap_to_shape: bool) -> StrokeRecorder {
        StrokeRecorder::new(
            ToolSettings::default(),
            RecorderOptions {
                smoothing,
                snap_to_shape,
            },
            3,
        )
    }

    fn event(phase: PointerPhase, x: f64, y: f64) -> NormalizedEvent {
        NormalizedEvent {
            phase,
            point: StrokePoint::new(x, y),
            source: InputSource::Mouse,
        }
    }

    fn draw(rec: &mut StrokeRecorder, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        rec.begin(StrokePoint::new(first.0, first.1));
        for (x, y) in rest {
            rec.update(StrokePoint::new(*x, *y));
        }
        rec.end();
    }

    #[test]
    fn test_basic_draw() {
        let mut rec = recorder(true, false);
        assert!(matches!(
            rec.handle(&event(PointerPhase::Down, 10.0, 10.0)),
            RecordOutcome::Started
        ));
        rec.handle(&event(PointerPhase::Move, 50.0, 10.0));
        rec.handle(&event(PointerPhase::Move, 50.0, 50.0));
        assert!(rec.state().is_drawing());
        assert!(matches!(
            rec.handle(&event(PointerPhase::Up, 50.0, 50.0)),
            RecordOutcome::Committed(_)
        ));

        let state = rec.state();
        assert_eq!(state.strokes().len(), 1);
        assert_eq!(state.strokes()[0].points.len(), 3);
        assert!(state.strokes()[0].completed);
        assert!(!state.is_drawing());
        assert!(state.current_stroke().is_none());
    }

    #[test]
    fn test_smoothing_formula() {
        let mut rec = recorder(true, false);
        draw(&mut rec, &[(10.0, 10.0), (50.0, 10.0), (50.0, 50.0)]);
        let middle = rec.state().strokes()[0].points[1];
        assert!((middle.x - 40.0).abs() < 1e-9);
        assert!((middle.y - 20.0).abs() < 1e-9);
        // Endpoints are never moved.
        assert_eq!(rec.state().strokes()[0].points[2].position(), kurbo::Point::new(50.0, 50.0));
    }

    #[test]
    fn test_smoothing_disabled() {
        let mut rec = recorder(false, false);
        draw(&mut rec, &[(10.0, 10.0), (50.0, 10.0), (50.0, 50.0)]);
        assert_eq!(rec.state().strokes()[0].points[1].position(), kurbo::Point::new(50.0, 10.0));
    }

    #[test]
    fn test_single_point_stroke_unchanged() {
        let mut rec = recorder(true, true);
        rec.begin(StrokePoint::new(25.0, 30.0));
        let committed = rec.end().unwrap();
        assert_eq!(committed.stroke.points, vec![StrokePoint::new(25.0, 30.0)]);
        assert!(committed.recognition.is_none());
    }

    #[test]
    fn test_cancel_discards_but_keeps_snapshot() {
        let mut rec = recorder(true, false);
        rec.handle(&event(PointerPhase::Down, 0.0, 0.0));
        assert!(matches!(
            rec.handle(&event(PointerPhase::Cancel, 0.0, 0.0)),
            RecordOutcome::Cancelled
        ));
        assert!(rec.state().strokes().is_empty());
        assert_eq!(rec.state().history().undo_len(), 1);
        assert!(!rec.state().is_drawing());
    }

    #[test]
    fn test_leave_commits() {
        let mut rec = recorder(false, false);
        rec.handle(&event(PointerPhase::Down, 0.0, 0.0));
        rec.handle(&event(PointerPhase::Move, 5.0, 0.0));
        assert!(matches!(
            rec.handle(&event(PointerPhase::Leave, 5.0, 0.0)),
            RecordOutcome::Committed(_)
        ));
        assert_eq!(rec.state().strokes().len(), 1);
    }

    #[test]
    fn test_idle_moves_are_noops() {
        let mut rec = recorder(true, false);
        assert!(!rec.update(StrokePoint::new(1.0, 1.0)));
        assert!(rec.end().is_none());
        assert!(rec.cancel().is_none());
        assert!(matches!(
            rec.handle(&event(PointerPhase::Up, 1.0, 1.0)),
            RecordOutcome::Ignored
        ));
    }

    #[test]
    fn test_second_down_ignored() {
        let mut rec = recorder(true, false);
        assert!(rec.begin(StrokePoint::new(0.0, 0.0)));
        assert!(!rec.begin(StrokePoint::new(9.0, 9.0)));
        assert_eq!(rec.state().history().undo_len(), 1);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut rec = recorder(true, false);
        for i in 0..3 {
            let y = i as f64 * 10.0;
            draw(&mut rec, &[(0.0, y), (10.0, y), (20.0, y + 1.0)]);
        }
        let original = rec.state().strokes().to_vec();

        for _ in 0..3 {
            assert!(rec.undo());
        }
        assert!(rec.state().strokes().is_empty());
        assert!(!rec.undo());

        for _ in 0..3 {
            assert!(rec.redo());
        }
        assert_eq!(rec.state().strokes(), &original[..]);
        assert!(!rec.redo());
    }

    #[test]
    fn test_undo_stack_bounded() {
        let mut rec = recorder(false, false);
        for i in 0..5 {
            draw(&mut rec, &[(i as f64, 0.0), (i as f64, 10.0)]);
            assert!(rec.state().history().undo_len() <= 3);
        }
        assert_eq!(rec.state().history().undo_len(), 3);
    }

    #[test]
    fn test_new_stroke_clears_redo() {
        let mut rec = recorder(false, false);
        draw(&mut rec, &[(0.0, 0.0), (10.0, 0.0)]);
        rec.undo();
        assert!(rec.state().history().can_redo());
        rec.begin(StrokePoint::new(1.0, 1.0));
        assert!(!rec.state().history().can_redo());
    }

    #[test]
    fn test_undo_while_drawing_is_noop() {
        let mut rec = recorder(false, false);
        draw(&mut rec, &[(0.0, 0.0), (10.0, 0.0)]);
        rec.begin(StrokePoint::new(1.0, 1.0));
        assert!(!rec.undo());
        assert!(rec.state().is_drawing());
    }

    #[test]
    fn test_clear_on_empty_canvas() {
        let mut rec = recorder(false, false);
        rec.clear();
        assert!(rec.state().strokes().is_empty());
        assert!(rec.undo());
        assert!(rec.state().strokes().is_empty());
    }

    #[test]
    fn test_clear_then_undo_restores() {
        let mut rec = recorder(false, false);
        draw(&mut rec, &[(0.0, 0.0), (10.0, 0.0)]);
        rec.clear();
        assert!(rec.state().strokes().is_empty());
        assert!(rec.undo());
        assert_eq!(rec.state().strokes().len(), 1);
    }

    #[test]
    fn test_snap_replaces_circle_points() {
        let mut rec = recorder(false, true);
        let points: Vec<(f64, f64)> = (0..64)
            .map(|i| {
                let angle = TAU * i as f64 / 64.0;
                (100.0 + 50.0 * angle.cos(), 100.0 + 50.0 * angle.sin())
            })
            .collect();
        rec.begin(StrokePoint::new(points[0].0, points[0].1));
        for (x, y) in &points[1..] {
            rec.update(StrokePoint::new(*x, *y));
        }
        let started_id = rec.state().current_stroke().unwrap().id;
        let committed = rec.end().unwrap();

        assert!(committed.snapped);
        let recognition = committed.recognition.unwrap();
        assert_eq!(recognition.shape, Some(ShapeKind::Circle));
        let stroke = &rec.state().strokes()[0];
        assert_eq!(stroke.id, started_id);
        assert_eq!(stroke.points.len(), 65);
        assert!(stroke.completed);
    }

    #[test]
    fn test_stationary_tap_not_snapped() {
        let mut rec = recorder(false, true);
        rec.begin(StrokePoint::new(40.0, 40.0));
        for _ in 0..5 {
            rec.update(StrokePoint::new(40.0, 40.0));
        }
        let committed = rec.end().unwrap();

        assert!(!committed.snapped);
        assert_eq!(committed.stroke.points.len(), 6);
        assert_eq!(committed.recognition.unwrap().shape, None);
    }

    #[test]
    fn test_eraser_never_snaps() {
        let mut rec = recorder(false, true);
        rec.set_tool(Tool::Eraser);
        draw(
            &mut rec,
            &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0), (50.0, 0.0)],
        );
        assert_eq!(rec.state().strokes()[0].points.len(), 6);
    }

    #[test]
    fn test_settings_apply_to_next_stroke() {
        let mut rec = recorder(false, false);
        rec.set_tool(Tool::Highlighter);
        rec.set_color(SerializableColor::new(255, 255, 0, 255));
        assert!(rec.set_width(4.0));
        assert!(!rec.set_width(-1.0));
        draw(&mut rec, &[(0.0, 0.0), (10.0, 0.0)]);

        let stroke = &rec.state().strokes()[0];
        assert_eq!(stroke.tool, Tool::Highlighter);
        assert_eq!(stroke.color, SerializableColor::new(255, 255, 0, 255));
        assert!((stroke.width - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_import_marks_completed() {
        let mut rec = recorder(false, false);
        let mut stroke = Stroke::begin(StrokePoint::new(0.0, 0.0), &ToolSettings::default());
        stroke.add_point(StrokePoint::new(5.0, 5.0));
        rec.import(vec![stroke]);

        assert_eq!(rec.state().strokes().len(), 1);
        assert!(rec.state().strokes()[0].completed);
        assert!(rec.undo());
        assert!(rec.state().strokes().is_empty());
    }
}
