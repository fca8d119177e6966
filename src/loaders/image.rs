//! Image loader.
//!
//! Keeps the raw bytes for the request and reads only the image header for
//! dimensions, color mode and container format.

use crate::domain::model::{DataKind, Metadata, NormalizedRecord};
use crate::domain::ports::Loader;
use crate::loaders::display_path;
use crate::utils::error::{GenAiError, Result};
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use serde_json::json;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn new() -> Self {
        Self
    }
}

/// Header facts read without decoding pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub mode: String,
}

impl Loader for ImageLoader {
    fn kind(&self) -> DataKind {
        DataKind::Image
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg", "png", "gif", "bmp", "webp"]
    }

    fn load(&self, path: &Path) -> Result<NormalizedRecord> {
        let source = display_path(path);
        tracing::debug!("Loading image: {}", source);

        let bytes = std::fs::read(path).map_err(|e| GenAiError::IoError(e).logged())?;

        let info = read_image_info(&bytes).map_err(|message| {
            GenAiError::DecodeError {
                path: source.clone(),
                message,
            }
            .logged()
        })?;

        tracing::debug!(
            "Image {}: {}x{} {} ({})",
            source,
            info.width,
            info.height,
            info.format,
            info.mode
        );

        let mut metadata = Metadata::new();
        metadata.insert("format".to_string(), json!(info.format));
        metadata.insert("width".to_string(), json!(info.width));
        metadata.insert("height".to_string(), json!(info.height));
        metadata.insert("mode".to_string(), json!(info.mode));
        metadata.insert("file_size".to_string(), json!(bytes.len()));

        Ok(NormalizedRecord::image(bytes, metadata, source))
    }

    fn check_capabilities(&self) -> Result<()> {
        for ext in self.extensions() {
            let readable = ImageFormat::from_extension(ext)
                .map(|format| format.reading_enabled())
                .unwrap_or(false);

            if !readable {
                return Err(GenAiError::ConfigError {
                    message: format!("image decoder for .{} is not available in this build", ext),
                });
            }
        }
        Ok(())
    }
}

/// Guess the container from the bytes and read its header.
pub fn read_image_info(bytes: &[u8]) -> std::result::Result<ImageInfo, String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image header: {e}"))?;

    let format = reader
        .format()
        .ok_or_else(|| "Unrecognized image container".to_string())?;

    let decoder = reader
        .into_decoder()
        .map_err(|e| format!("Failed to load image: {e}"))?;

    let (width, height) = decoder.dimensions();

    Ok(ImageInfo {
        format: format!("{format:?}").to_uppercase(),
        width,
        height,
        mode: color_mode(decoder.color_type()),
    })
}

fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        other => format!("{other:?}"),
    }
}
