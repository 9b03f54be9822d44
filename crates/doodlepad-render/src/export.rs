//! Image export: PNG/JPEG encoding and data URLs.

use crate::renderer::{RenderResult, RendererError};
use base64::Engine;
use image::ImageEncoder;
use std::fmt;
use std::str::FromStr;

/// Default JPEG quality on the `[0, 1]` scale.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// Export image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image/png" => Ok(ExportFormat::Png),
            "image/jpeg" => Ok(ExportFormat::Jpeg),
            other => ExportFormat::from_extension(other)
                .ok_or_else(|| format!("Unknown export format: {}", other)),
        }
    }
}

/// Encode RGBA8 pixels in `format`.
///
/// `quality` is in `[0, 1]` and only affects JPEG.
pub fn encode(
    format: ExportFormat,
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: f64,
) -> RenderResult<Vec<u8>> {
    check_len(rgba, width, height)?;
    let bytes = match format {
        ExportFormat::Png => encode_png(rgba, width, height)?,
        ExportFormat::Jpeg => encode_jpeg(rgba, width, height, quality)?,
    };
    log::info!("Encoded {}x{} {} ({} bytes)", width, height, format, bytes.len());
    Ok(bytes)
}

/// Encode RGBA8 pixels to PNG bytes.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encoding(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| RendererError::Encoding(format!("PNG data: {}", e)))?;
    }
    Ok(png_data)
}

/// Encode RGBA8 pixels to JPEG, flattening alpha onto white.
pub fn encode_jpeg(rgba: &[u8], width: u32, height: u32, quality: f64) -> RenderResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        let alpha = f32::from(pixel[3]) / 255.0;
        let inv = 255.0 * (1.0 - alpha);
        for &channel in &pixel[..3] {
            rgb.push(f32::from(channel).mul_add(alpha, inv).round() as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
    encoder
        .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RendererError::Encoding(format!("JPEG: {}", e)))?;
    Ok(buf.into_inner())
}

/// Map a `[0, 1]` quality to the encoder's 1-100 scale.
pub fn jpeg_quality(quality: f64) -> u8 {
    let quality = if quality.is_finite() {
        quality
    } else {
        DEFAULT_JPEG_QUALITY
    };
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Wrap encoded image bytes in a `data:` URL.
pub fn to_data_url(format: ExportFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn check_len(rgba: &[u8], width: u32, height: u32) -> RenderResult<()> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(RendererError::Encoding(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            rgba.len()
        )));
    }
    Ok(())
}
