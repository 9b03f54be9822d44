//! Doodlepad Core Library
//!
//! Platform-agnostic stroke capture, shape recognition and undo history for
//! the Doodlepad drawing canvas.

pub mod analysis;
pub mod color;
pub mod config;
pub mod geometry;
pub mod history;
pub mod input;
pub mod recognizer;
pub mod recorder;
pub mod stroke;
pub mod tools;

pub use analysis::DrawingAnalysis;
pub use color::SerializableColor;
pub use config::{CanvasConfig, CanvasOptions, ConfigError};
pub use history::{DEFAULT_UNDO_LIMIT, History};
pub use input::{
    InputNormalizer, InputSource, MouseButton, NormalizedEvent, PointerPhase, RawInput,
    TouchContact,
};
pub use recognizer::{RecognitionResult, ShapeKind, ShapeRecognizer};
pub use recorder::{CanvasState, CommittedStroke, RecordOutcome, RecorderOptions, StrokeRecorder};
pub use stroke::{
    DEFAULT_PRESSURE, Stroke, StrokeFormatError, StrokeId, StrokePoint, strokes_from_json,
    strokes_to_json,
};
pub use tools::{AgeDefaults, AgeGroup, Tool, ToolSettings};
