//! Doodlepad Application
//!
//! The drawing canvas shell: binds an element to input normalization, stroke
//! recording, shape recognition, rendering and notification callbacks.

mod canvas;
mod element;

pub use canvas::{CanvasCallbacks, CanvasError, DrawingCanvas};
pub use element::{CanvasElement, OffscreenCanvas};
