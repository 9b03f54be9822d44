//! CPU raster surface backed by tiny-skia.

use crate::renderer::{Layer, Paint, RenderResult, RendererError, Surface};
use kurbo::{BezPath, PathEl};
use peniko::{BlendMode, Color, Compose, Mix};
use tiny_skia::{FillRule, LineCap, LineJoin, Pixmap, PixmapPaint, Transform};

/// Two-layer pixmap surface.
///
/// Strokes go to the ink layer; the background layer holds the fill color and
/// grid. [`Surface::read_pixels`] composites ink over background.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    background: Pixmap,
    ink: Pixmap,
    layer: Layer,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let allocate = || {
            Pixmap::new(width, height).ok_or_else(|| {
                RendererError::Surface(format!("cannot allocate {}x{} pixmap", width, height))
            })
        };
        Ok(Self {
            background: allocate()?,
            ink: allocate()?,
            layer: Layer::Ink,
        })
    }

    /// Ink composited over the background.
    pub fn composite(&self) -> Pixmap {
        let mut out = self.background.clone();
        out.draw_pixmap(
            0,
            0,
            self.ink.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        out
    }

    fn target(&mut self) -> &mut Pixmap {
        match self.layer {
            Layer::Background => &mut self.background,
            Layer::Ink => &mut self.ink,
        }
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.ink.width(), self.ink.height())
    }

    fn clear(&mut self, color: Color) {
        self.background.fill(to_skia_color(color));
        self.ink.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let skia_paint = to_skia_paint(paint);
        self.target().fill_path(
            &skia_path,
            &skia_paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let skia_paint = to_skia_paint(paint);
        let stroke = tiny_skia::Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.target()
            .stroke_path(&skia_path, &skia_paint, &stroke, Transform::identity(), None);
    }

    fn read_pixels(&self) -> RenderResult<Vec<u8>> {
        let composite = self.composite();
        let mut rgba = Vec::with_capacity(composite.data().len());
        for pixel in composite.pixels() {
            let color = pixel.demultiply();
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Ok(rgba)
    }
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn to_skia_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
    let rgba = paint.color.to_rgba8();
    let mut skia_paint = tiny_skia::Paint::default();
    skia_paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    skia_paint.anti_alias = true;
    skia_paint.blend_mode = to_skia_blend(paint.blend);
    skia_paint
}

/// Map the blend modes the renderer uses; anything else draws source-over.
fn to_skia_blend(blend: BlendMode) -> tiny_skia::BlendMode {
    match (blend.mix, blend.compose) {
        (_, Compose::DestOut) => tiny_skia::BlendMode::DestinationOut,
        (_, Compose::Clear) => tiny_skia::BlendMode::Clear,
        (Mix::Multiply, _) => tiny_skia::BlendMode::Multiply,
        (Mix::Screen, _) => tiny_skia::BlendMode::Screen,
        _ => tiny_skia::BlendMode::SourceOver,
    }
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}
