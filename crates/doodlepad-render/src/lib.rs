//! Doodlepad Render Library
//!
//! Surface abstraction, stroke rendering and image export for Doodlepad.
//! The built-in surface rasterizes on the CPU with tiny-skia.

pub mod export;
mod raster;
mod renderer;

pub use export::{ExportFormat, encode, to_data_url};
pub use raster::PixmapSurface;
pub use renderer::{
    GRID_SIZE, Layer, Paint, RenderContext, RenderResult, RendererError, StrokeRenderer, Surface,
    drawn_width, stroke_path,
};
