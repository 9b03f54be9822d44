//! Surface abstraction and stroke rendering.

use doodlepad_core::{Stroke, StrokePoint, Tool};
use kurbo::{BezPath, Circle, Point, Shape};
use peniko::{BlendMode, Color, Compose, Mix};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid spacing in pixels.
pub const GRID_SIZE: f64 = 20.0;
/// Grid line opacity.
pub const GRID_OPACITY: f32 = 0.3;
/// Highlighter ink opacity.
pub const HIGHLIGHTER_OPACITY: f32 = 0.4;

/// Crayon glow is drawn this much wider than the stroke...
const GLOW_WIDTH_FACTOR: f64 = 1.6;
/// ...at this opacity.
const GLOW_OPACITY: f32 = 0.25;
const CIRCLE_TOLERANCE: f64 = 0.1;

/// Drawing layer.
///
/// Erasing only affects the ink layer so the background shows through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    Background,
    #[default]
    Ink,
}

/// Color and compositing for one draw call.
#[derive(Debug, Clone, Copy)]
pub struct Paint {
    pub color: Color,
    pub blend: BlendMode,
}

impl Paint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            blend: BlendMode::default(),
        }
    }

    pub fn with_blend(mut self, blend: impl Into<BlendMode>) -> Self {
        self.blend = blend.into();
        self
    }

    /// Paint used for strokes drawn with `tool`.
    pub fn for_tool(tool: Tool, color: Color) -> Self {
        match tool {
            Tool::Highlighter => Paint::new(color.multiply_alpha(HIGHLIGHTER_OPACITY))
                .with_blend(BlendMode::new(Mix::Multiply, Compose::SrcOver)),
            // Only the source alpha matters for destination-out.
            Tool::Eraser => Paint::new(Color::BLACK).with_blend(Compose::DestOut),
            Tool::Pen | Tool::Crayon | Tool::Brush => Paint::new(color),
        }
    }
}

/// A 2D drawing surface the renderer can target.
pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the background layer with `color` and clear the ink layer.
    fn clear(&mut self, color: Color);

    /// Select the layer subsequent draw calls go to.
    fn set_layer(&mut self, layer: Layer);

    fn fill_path(&mut self, path: &BezPath, paint: &Paint);

    /// Stroke with round caps and joins.
    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint);

    /// Composited, non-premultiplied RGBA8 pixels, row-major.
    fn read_pixels(&self) -> RenderResult<Vec<u8>>;
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub strokes: &'a [Stroke],
    /// Stroke still being drawn, painted last.
    pub current_stroke: Option<&'a Stroke>,
    pub background_color: Color,
    pub grid_assist: bool,
    pub smoothing: bool,
    pub enable_pressure: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(strokes: &'a [Stroke]) -> Self {
        Self {
            strokes,
            current_stroke: None,
            background_color: Color::WHITE,
            grid_assist: false,
            smoothing: true,
            enable_pressure: true,
        }
    }

    pub fn with_current_stroke(mut self, stroke: Option<&'a Stroke>) -> Self {
        self.current_stroke = stroke;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, grid_assist: bool) -> Self {
        self.grid_assist = grid_assist;
        self
    }

    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_pressure(mut self, enable_pressure: bool) -> Self {
        self.enable_pressure = enable_pressure;
        self
    }
}

/// Draws strokes onto a [`Surface`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrokeRenderer;

impl StrokeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Redraw the whole frame.
    pub fn render(&self, ctx: &RenderContext, surface: &mut impl Surface) {
        surface.clear(ctx.background_color);

        if ctx.grid_assist {
            surface.set_layer(Layer::Background);
            self.render_grid(surface);
        }

        surface.set_layer(Layer::Ink);
        for stroke in ctx.strokes.iter().chain(ctx.current_stroke) {
            self.render_stroke(stroke, ctx, surface);
        }
    }

    fn render_grid(&self, surface: &mut impl Surface) {
        let (width, height) = surface.size();
        let (width, height) = (width as f64, height as f64);
        let paint = Paint::new(Color::from_rgba8(180, 180, 180, 255).multiply_alpha(GRID_OPACITY));

        let mut path = BezPath::new();
        let mut x = GRID_SIZE;
        while x < width {
            path.move_to(Point::new(x, 0.0));
            path.line_to(Point::new(x, height));
            x += GRID_SIZE;
        }
        let mut y = GRID_SIZE;
        while y < height {
            path.move_to(Point::new(0.0, y));
            path.line_to(Point::new(width, y));
            y += GRID_SIZE;
        }
        surface.stroke_path(&path, 1.0, &paint);
    }

    fn render_stroke(&self, stroke: &Stroke, ctx: &RenderContext, surface: &mut impl Surface) {
        let Some(&first) = stroke.points.first() else {
            return;
        };

        let width = drawn_width(stroke, ctx.enable_pressure);
        let paint = Paint::for_tool(stroke.tool, stroke.color.into());
        let glow = (stroke.tool == Tool::Crayon)
            .then(|| Paint::new(paint.color.multiply_alpha(GLOW_OPACITY)));

        if stroke.points.len() == 1 {
            let center = first.position();
            if let Some(glow) = &glow {
                surface.fill_path(&dot(center, width * GLOW_WIDTH_FACTOR), glow);
            }
            surface.fill_path(&dot(center, width), &paint);
            return;
        }

        let path = stroke_path(&stroke.points, ctx.smoothing);
        if let Some(glow) = &glow {
            surface.stroke_path(&path, width * GLOW_WIDTH_FACTOR, glow);
        }
        surface.stroke_path(&path, width, &paint);
    }
}

/// Width a stroke is drawn at.
///
/// With pressure enabled this is `width * (0.5 + mean pressure)`, so the
/// default mouse pressure of 0.5 draws at exactly `width`.
pub fn drawn_width(stroke: &Stroke, enable_pressure: bool) -> f64 {
    if enable_pressure {
        stroke.width * (0.5 + stroke.mean_pressure())
    } else {
        stroke.width
    }
}

/// Outline through the stroke's points.
///
/// With smoothing, each interior point is the control point of a quadratic
/// curve ending at the midpoint to the next point; the final segment is a
/// straight line to the last point.
pub fn stroke_path(points: &[StrokePoint], smoothing: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first.position());

    if smoothing && points.len() > 2 {
        for pair in points[1..].windows(2) {
            let control = pair[0].position();
            path.quad_to(control, control.midpoint(pair[1].position()));
        }
        if let Some(last) = points.last() {
            path.line_to(last.position());
        }
    } else {
        for point in rest {
            path.line_to(point.position());
        }
    }
    path
}

fn dot(center: Point, diameter: f64) -> BezPath {
    Circle::new(center, diameter / 2.0).to_path(CIRCLE_TOLERANCE)
}
