//! Raster image intake and PNG data URI encoding

use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use tracing::debug;

use crate::codec::base64;
use crate::error::{AppError, Result};

/// Upload formats the form accepts
pub const ACCEPTED_UPLOAD_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Decode an uploaded file into an in-memory raster image
pub fn load_upload(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AppError::InvalidInput("uploaded image is empty".to_string()));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| AppError::Encoding(format!("unrecognised image data: {}", e)))?;

    if !ACCEPTED_UPLOAD_FORMATS.contains(&format) {
        return Err(AppError::Encoding(format!(
            "{:?} uploads are not supported; use jpg, jpeg, png or webp",
            format
        )));
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AppError::Encoding(format!("failed to decode {:?} image: {}", format, e)))?;

    debug!(?format, width = image.width(), height = image.height(), "Decoded upload");
    Ok(image)
}

/// Serialize an image as PNG bytes
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .map_err(|e| AppError::Encoding(format!("failed to encode PNG: {}", e)))?;
    Ok(png)
}

/// Serialize an image as `data:image/png;base64,...`
pub fn encode_data_uri(image: &DynamicImage) -> Result<String> {
    let png = encode_png(image)?;
    Ok(base64::create_data_url(&png, "image/png"))
}
