//! Input normalization for mouse and touch events.
//!
//! Platform adapters describe raw events with [`RawInput`]; the
//! [`InputNormalizer`] turns them into canvas-local [`NormalizedEvent`]s and
//! makes sure only one contact drives a stroke at a time.

use crate::stroke::{DEFAULT_PRESSURE, StrokePoint};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the canvas; commits like `Up`.
    Leave,
    /// The platform aborted the interaction; discards the stroke.
    Cancel,
}

/// One touch point reported by a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchContact {
    pub identifier: u64,
    /// Position in client (page) coordinates.
    pub position: Point,
    /// Reported force in `[0, 1]`; zero or absent means unsupported.
    pub force: Option<f64>,
}

/// Raw event from the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawInput {
    Mouse {
        phase: PointerPhase,
        /// Position in client (page) coordinates.
        position: Point,
        button: MouseButton,
        timestamp: Option<f64>,
    },
    Touch {
        phase: PointerPhase,
        /// Contacts that changed in this event.
        contacts: Vec<TouchContact>,
        timestamp: Option<f64>,
    },
}

impl RawInput {
    /// Left-button mouse event without a timestamp.
    pub fn mouse(phase: PointerPhase, position: Point) -> Self {
        RawInput::Mouse {
            phase,
            position,
            button: MouseButton::Left,
            timestamp: None,
        }
    }

    /// Single-contact touch event without a timestamp.
    pub fn touch(
        phase: PointerPhase,
        identifier: u64,
        position: Point,
        force: Option<f64>,
    ) -> Self {
        RawInput::Touch {
            phase,
            contacts: vec![TouchContact {
                identifier,
                position,
                force,
            }],
            timestamp: None,
        }
    }
}

/// Which device owns the active stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Mouse,
    Touch(u64),
}

/// A pointer event in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedEvent {
    pub phase: PointerPhase,
    pub point: StrokePoint,
    pub source: InputSource,
}

/// Converts raw events into canvas-local points for a single active contact.
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    active: Option<InputSource>,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source currently driving a stroke, if any.
    pub fn active_source(&self) -> Option<InputSource> {
        self.active
    }

    /// Forget the active contact.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Normalize a raw event against the canvas's bounding rectangle.
    ///
    /// Returns `None` for events that must not reach the stroke recorder:
    /// non-left mouse buttons, a second contact while one is active, and
    /// moves or releases from a source that does not own the stroke.
    pub fn normalize(&mut self, raw: &RawInput, bounds: Rect) -> Option<NormalizedEvent> {
        match raw {
            RawInput::Mouse {
                phase,
                position,
                button,
                timestamp,
            } => {
                if *phase == PointerPhase::Down && *button != MouseButton::Left {
                    return None;
                }
                let point = local_point(*position, bounds, DEFAULT_PRESSURE, *timestamp);
                self.route(*phase, InputSource::Mouse, point)
            }
            RawInput::Touch {
                phase,
                contacts,
                timestamp,
            } => {
                let contact = match (phase, self.active) {
                    (PointerPhase::Down, None) => contacts.first(),
                    (_, Some(InputSource::Touch(id))) => {
                        contacts.iter().find(|c| c.identifier == id)
                    }
                    _ => None,
                }?;
                let pressure = contact
                    .force
                    .filter(|force| *force > 0.0)
                    .map_or(DEFAULT_PRESSURE, |force| force.clamp(0.0, 1.0));
                let point = local_point(contact.position, bounds, pressure, *timestamp);
                self.route(*phase, InputSource::Touch(contact.identifier), point)
            }
        }
    }

    fn route(
        &mut self,
        phase: PointerPhase,
        source: InputSource,
        point: StrokePoint,
    ) -> Option<NormalizedEvent> {
        match phase {
            PointerPhase::Down => {
                if self.active.is_some() {
                    log::debug!("Ignoring {:?} down while another contact is drawing", source);
                    return None;
                }
                self.active = Some(source);
            }
            PointerPhase::Move => {
                if self.active != Some(source) {
                    return None;
                }
            }
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => {
                if self.active != Some(source) {
                    return None;
                }
                self.active = None;
            }
        }

        Some(NormalizedEvent {
            phase,
            point,
            source,
        })
    }
}

fn local_point(client: Point, bounds: Rect, pressure: f64, timestamp: Option<f64>) -> StrokePoint {
    StrokePoint {
        x: client.x - bounds.x0,
        y: client.y - bounds.y0,
        pressure,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(100.0, 50.0, 900.0, 650.0)
    }

    #[test]
    fn test_mouse_is_canvas_local_with_mid_pressure() {
        let mut input = InputNormalizer::new();
        let event = input
            .normalize(&RawInput::mouse(PointerPhase::Down, Point::new(110.0, 70.0)), bounds())
            .unwrap();
        assert_eq!(event.point.position(), Point::new(10.0, 20.0));
        assert_eq!(event.point.pressure, DEFAULT_PRESSURE);
        assert_eq!(input.active_source(), Some(InputSource::Mouse));
    }

    #[test]
    fn test_touch_uses_force() {
        let mut input = InputNormalizer::new();
        let event = input
            .normalize(
                &RawInput::touch(PointerPhase::Down, 7, Point::new(100.0, 50.0), Some(0.8)),
                bounds(),
            )
            .unwrap();
        assert!((event.point.pressure - 0.8).abs() < f64::EPSILON);
        assert_eq!(event.source, InputSource::Touch(7));
    }

    #[test]
    fn test_touch_without_force_defaults() {
        let mut input = InputNormalizer::new();
        for force in [None, Some(0.0)] {
            input.reset();
            let event = input
                .normalize(
                    &RawInput::touch(PointerPhase::Down, 1, Point::new(100.0, 50.0), force),
                    bounds(),
                )
                .unwrap();
            assert_eq!(event.point.pressure, DEFAULT_PRESSURE);
        }
    }

    #[test]
    fn test_right_click_ignored() {
        let mut input = InputNormalizer::new();
        let raw = RawInput::Mouse {
            phase: PointerPhase::Down,
            position: Point::new(120.0, 60.0),
            button: MouseButton::Right,
            timestamp: None,
        };
        assert!(input.normalize(&raw, bounds()).is_none());
        assert!(input.active_source().is_none());
    }

    #[test]
    fn test_no_cross_talk_between_mouse_and_touch() {
        let mut input = InputNormalizer::new();
        input.normalize(&RawInput::mouse(PointerPhase::Down, Point::new(120.0, 60.0)), bounds());

        let touch_down = RawInput::touch(PointerPhase::Down, 3, Point::new(200.0, 200.0), None);
        assert!(input.normalize(&touch_down, bounds()).is_none());
        let touch_move = RawInput::touch(PointerPhase::Move, 3, Point::new(210.0, 200.0), None);
        assert!(input.normalize(&touch_move, bounds()).is_none());

        let up = input
            .normalize(&RawInput::mouse(PointerPhase::Up, Point::new(130.0, 60.0)), bounds())
            .unwrap();
        assert_eq!(up.phase, PointerPhase::Up);
        assert!(input.active_source().is_none());
    }

    #[test]
    fn test_second_finger_ignored() {
        let mut input = InputNormalizer::new();
        input.normalize(
            &RawInput::touch(PointerPhase::Down, 1, Point::new(150.0, 150.0), None),
            bounds(),
        );
        assert!(
            input
                .normalize(
                    &RawInput::touch(PointerPhase::Down, 2, Point::new(300.0, 300.0), None),
                    bounds(),
                )
                .is_none()
        );

        // A move event carrying both contacts only reports the first finger.
        let raw = RawInput::Touch {
            phase: PointerPhase::Move,
            contacts: vec![
                TouchContact {
                    identifier: 2,
                    position: Point::new(310.0, 310.0),
                    force: None,
                },
                TouchContact {
                    identifier: 1,
                    position: Point::new(160.0, 150.0),
                    force: None,
                },
            ],
            timestamp: Some(16.0),
        };
        let event = input.normalize(&raw, bounds()).unwrap();
        assert_eq!(event.point.position(), Point::new(60.0, 100.0));
        assert_eq!(event.point.timestamp, Some(16.0));
    }

    #[test]
    fn test_hover_move_ignored() {
        let mut input = InputNormalizer::new();
        let raw = RawInput::mouse(PointerPhase::Move, Point::new(120.0, 60.0));
        assert!(input.normalize(&raw, bounds()).is_none());
    }

    #[test]
    fn test_cancel_releases_contact() {
        let mut input = InputNormalizer::new();
        input.normalize(
            &RawInput::touch(PointerPhase::Down, 4, Point::new(150.0, 150.0), None),
            bounds(),
        );
        let cancel = input
            .normalize(
                &RawInput::touch(PointerPhase::Cancel, 4, Point::new(150.0, 150.0), None),
                bounds(),
            )
            .unwrap();
        assert_eq!(cancel.phase, PointerPhase::Cancel);
        assert!(input.active_source().is_none());
    }
}
