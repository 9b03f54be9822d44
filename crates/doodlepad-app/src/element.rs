//! Canvas elements: where a drawing canvas gets its surface and position.

use doodlepad_render::{PixmapSurface, Surface};
use kurbo::{Point, Rect, Size};

/// A host element the canvas draws into.
pub trait CanvasElement {
    type Surface: Surface;

    /// Element bounds in client coordinates; raw input is relative to this.
    fn bounding_rect(&self) -> Rect;

    /// Acquire a 2D surface of the given size, or `None` if unavailable.
    fn context_2d(&mut self, width: u32, height: u32) -> Option<Self::Surface>;
}

/// Element backed by an in-memory pixmap.
#[derive(Debug, Clone, Default)]
pub struct OffscreenCanvas {
    origin: Point,
    size: Size,
}

impl OffscreenCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the element at `origin` in client coordinates.
    pub fn at(origin: Point) -> Self {
        Self {
            origin,
            size: Size::ZERO,
        }
    }
}

impl CanvasElement for OffscreenCanvas {
    type Surface = PixmapSurface;

    fn bounding_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    fn context_2d(&mut self, width: u32, height: u32) -> Option<PixmapSurface> {
        match PixmapSurface::new(width, height) {
            Ok(surface) => {
                self.size = Size::new(width as f64, height as f64);
                Some(surface)
            }
            Err(e) => {
                log::error!("Offscreen canvas unavailable: {}", e);
                None
            }
        }
    }
}
