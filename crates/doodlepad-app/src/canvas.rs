//! The drawing canvas: input, recording, rendering and callbacks wired together.

use crate::element::CanvasElement;
use doodlepad_core::{
    CanvasConfig, CanvasOptions, CanvasState, CommittedStroke, ConfigError, DrawingAnalysis,
    InputNormalizer, RawInput, RecognitionResult, RecordOutcome, SerializableColor, Stroke,
    StrokeRecorder, Tool,
};
use doodlepad_render::{
    ExportFormat, RenderContext, RendererError, StrokeRenderer, Surface, encode, to_data_url,
};
use std::fmt;
use thiserror::Error;

/// Canvas errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Canvas element has no 2D drawing context")]
    NoDrawingContext,
    #[error("Canvas has been destroyed")]
    Destroyed,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Export failed: {0}")]
    Export(#[from] RendererError),
}

type StrokeCallback = Box<dyn FnMut(&Stroke)>;
type DrawingCallback = Box<dyn FnMut(&[Stroke])>;
type RecognitionCallback = Box<dyn FnMut(&RecognitionResult)>;
type ClearCallback = Box<dyn FnMut()>;

/// Notification hooks. All are optional.
#[derive(Default)]
pub struct CanvasCallbacks {
    /// A stroke was committed.
    pub on_stroke_complete: Option<StrokeCallback>,
    /// The stroke list after every commit.
    pub on_drawing_complete: Option<DrawingCallback>,
    /// Shape recognition ran on a committed stroke.
    pub on_recognition: Option<RecognitionCallback>,
    pub on_clear: Option<ClearCallback>,
}

impl CanvasCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stroke_complete(mut self, f: impl FnMut(&Stroke) + 'static) -> Self {
        self.on_stroke_complete = Some(Box::new(f));
        self
    }

    pub fn on_drawing_complete(mut self, f: impl FnMut(&[Stroke]) + 'static) -> Self {
        self.on_drawing_complete = Some(Box::new(f));
        self
    }

    pub fn on_recognition(mut self, f: impl FnMut(&RecognitionResult) + 'static) -> Self {
        self.on_recognition = Some(Box::new(f));
        self
    }

    pub fn on_clear(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_clear = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for CanvasCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasCallbacks")
            .field("on_stroke_complete", &self.on_stroke_complete.is_some())
            .field("on_drawing_complete", &self.on_drawing_complete.is_some())
            .field("on_recognition", &self.on_recognition.is_some())
            .field("on_clear", &self.on_clear.is_some())
            .finish()
    }
}

/// An interactive drawing canvas bound to one element.
///
/// Every state change re-renders synchronously. After [`destroy`](Self::destroy)
/// the canvas ignores all further calls.
pub struct DrawingCanvas<E: CanvasElement> {
    element: E,
    surface: Option<E::Surface>,
    config: CanvasConfig,
    recorder: StrokeRecorder,
    input: InputNormalizer,
    renderer: StrokeRenderer,
    callbacks: CanvasCallbacks,
}

impl<E: CanvasElement> DrawingCanvas<E> {
    pub fn new(mut element: E, config: CanvasConfig) -> Result<Self, CanvasError> {
        config.validate()?;
        let surface = element
            .context_2d(config.width, config.height)
            .ok_or(CanvasError::NoDrawingContext)?;

        let mut canvas = Self {
            element,
            surface: Some(surface),
            recorder: StrokeRecorder::from_config(&config),
            config,
            input: InputNormalizer::new(),
            renderer: StrokeRenderer::new(),
            callbacks: CanvasCallbacks::default(),
        };
        log::info!(
            "Canvas created: {}x{}, tool {}, age group {:?}",
            canvas.config.width,
            canvas.config.height,
            canvas.config.tool,
            canvas.config.age_group.map(|g| g.tag())
        );
        canvas.render();
        Ok(canvas)
    }

    /// Resolve `options` and create the canvas.
    pub fn with_options(element: E, options: &CanvasOptions) -> Result<Self, CanvasError> {
        Self::new(element, CanvasConfig::resolve(options)?)
    }

    pub fn set_callbacks(&mut self, callbacks: CanvasCallbacks) {
        if self.is_destroyed() {
            log::warn!("set_callbacks on a destroyed canvas");
            return;
        }
        self.callbacks = callbacks;
    }

    /// Feed one raw input event. Returns true if it changed the canvas.
    pub fn handle_input(&mut self, raw: &RawInput) -> bool {
        if self.is_destroyed() {
            log::warn!("Input on a destroyed canvas");
            return false;
        }

        let bounds = self.element.bounding_rect();
        let Some(event) = self.input.normalize(raw, bounds) else {
            return false;
        };

        match self.recorder.handle(&event) {
            RecordOutcome::Ignored => false,
            RecordOutcome::Started | RecordOutcome::Extended | RecordOutcome::Cancelled => {
                self.render();
                true
            }
            RecordOutcome::Committed(committed) => {
                self.render();
                self.notify_commit(&committed);
                true
            }
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.guard("set_tool") {
            self.recorder.set_tool(tool);
            log::debug!("Tool set to {}", tool);
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        if self.guard("set_color") {
            self.recorder.set_color(color);
        }
    }

    /// Set the base stroke width. Non-positive widths are ignored.
    pub fn set_width(&mut self, width: f64) {
        if self.guard("set_width") && !self.recorder.set_width(width) {
            log::warn!("Ignoring stroke width {}", width);
        }
    }

    pub fn undo(&mut self) -> bool {
        if !self.guard("undo") || !self.recorder.undo() {
            return false;
        }
        self.render();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.guard("redo") || !self.recorder.redo() {
            return false;
        }
        self.render();
        true
    }

    /// Remove all strokes. Undo restores them.
    pub fn clear(&mut self) {
        if !self.guard("clear") {
            return;
        }
        self.recorder.clear();
        self.input.reset();
        self.render();
        log::debug!("Canvas cleared");
        if let Some(on_clear) = self.callbacks.on_clear.as_mut() {
            on_clear();
        }
    }

    /// Replace the drawing with `strokes`. Undo restores the previous drawing.
    pub fn import_strokes(&mut self, strokes: Vec<Stroke>) {
        if !self.guard("import_strokes") {
            return;
        }
        self.recorder.import(strokes);
        self.input.reset();
        self.render();
        log::info!("Imported {} strokes", self.recorder.state().strokes().len());
    }

    pub fn export_strokes(&self) -> Vec<Stroke> {
        self.recorder.state().strokes().to_vec()
    }

    /// Encode the current frame as a `data:` URL. `quality` in `[0, 1]` applies to JPEG.
    pub fn export_to_data_url(
        &self,
        format: ExportFormat,
        quality: f64,
    ) -> Result<String, CanvasError> {
        Ok(to_data_url(format, &self.export_image(format, quality)?))
    }

    /// Encode the current frame as image bytes.
    pub fn export_image(&self, format: ExportFormat, quality: f64) -> Result<Vec<u8>, CanvasError> {
        let surface = self.surface.as_ref().ok_or(CanvasError::Destroyed)?;
        let (width, height) = surface.size();
        let pixels = surface.read_pixels()?;
        Ok(encode(format, &pixels, width, height, quality)?)
    }

    pub fn analyze_drawing(&self) -> DrawingAnalysis {
        DrawingAnalysis::from_strokes(self.recorder.state().strokes())
    }

    pub fn state(&self) -> &CanvasState {
        self.recorder.state()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.state().history().can_undo() && !self.state().is_drawing()
    }

    pub fn can_redo(&self) -> bool {
        self.state().history().can_redo() && !self.state().is_drawing()
    }

    pub fn is_empty(&self) -> bool {
        self.state().strokes().is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.surface.is_none()
    }

    /// Release the surface and callbacks.
    pub fn destroy(&mut self) {
        if self.surface.take().is_some() {
            self.callbacks = CanvasCallbacks::default();
            self.input.reset();
            log::info!("Canvas destroyed");
        }
    }

    fn guard(&self, op: &str) -> bool {
        if self.is_destroyed() {
            log::warn!("{} on a destroyed canvas", op);
            return false;
        }
        true
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let state = self.recorder.state();
        let ctx = RenderContext::new(state.strokes())
            .with_current_stroke(state.current_stroke())
            .with_background(self.config.background_color.into())
            .with_grid(self.config.grid_assist)
            .with_smoothing(self.config.smoothing)
            .with_pressure(self.config.enable_pressure);
        self.renderer.render(&ctx, surface);
    }

    fn notify_commit(&mut self, committed: &CommittedStroke) {
        let callbacks = &mut self.callbacks;
        if let (Some(result), Some(on_recognition)) =
            (&committed.recognition, callbacks.on_recognition.as_mut())
        {
            on_recognition(result);
        }
        if let Some(on_stroke_complete) = callbacks.on_stroke_complete.as_mut() {
            on_stroke_complete(&committed.stroke);
        }
        if let Some(on_drawing_complete) = callbacks.on_drawing_complete.as_mut() {
            on_drawing_complete(self.recorder.state().strokes());
        }
    }
}

impl<E: CanvasElement + fmt::Debug> fmt::Debug for DrawingCanvas<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingCanvas")
            .field("element", &self.element)
            .field("config", &self.config)
            .field("strokes", &self.state().strokes().len())
            .field("destroyed", &self.is_destroyed())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
