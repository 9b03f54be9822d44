//! Command-line entry point: replay a stroke file and export the drawing.
//!
//! Usage: `doodlepad <strokes.json> <out.png|out.jpg> [options.json]`

use doodlepad_app::{CanvasError, DrawingCanvas, OffscreenCanvas};
use doodlepad_core::{CanvasOptions, ConfigError, StrokeFormatError, strokes_from_json};
use doodlepad_render::export::DEFAULT_JPEG_QUALITY;
use doodlepad_render::ExportFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("Usage: doodlepad <strokes.json> <out.png|out.jpg> [options.json]")]
    Usage,
    #[error("Unsupported output format: {0}")]
    Format(String),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Strokes(#[from] StrokeFormatError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("Failed to format analysis: {0}")]
    Analysis(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::init();

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), CliError> {
    let (strokes_path, output_path, options_path) = match args.as_slice() {
        [strokes, output] => (Path::new(strokes), Path::new(output), None),
        [strokes, output, options] => (
            Path::new(strokes),
            Path::new(output),
            Some(Path::new(options)),
        ),
        _ => return Err(CliError::Usage),
    };

    let format = output_path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .ok_or_else(|| CliError::Format(output_path.display().to_string()))?;

    let options = match options_path {
        Some(path) => CanvasOptions::load(path)?,
        None => CanvasOptions::default(),
    };

    let json = std::fs::read_to_string(strokes_path).map_err(|source| CliError::Io {
        path: strokes_path.to_path_buf(),
        source,
    })?;
    let strokes = strokes_from_json(&json)?;
    log::info!("Loaded {} strokes from {}", strokes.len(), strokes_path.display());

    let mut canvas = DrawingCanvas::with_options(OffscreenCanvas::new(), &options)?;
    canvas.import_strokes(strokes);

    let analysis = canvas.analyze_drawing();
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    let bytes = canvas.export_image(format, DEFAULT_JPEG_QUALITY)?;
    std::fs::write(output_path, &bytes).map_err(|source| CliError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {} ({} bytes)", output_path.display(), bytes.len());

    canvas.destroy();
    Ok(())
}
