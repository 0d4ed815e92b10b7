//! Downloaded asset and format sniffing

use tracing::debug;

use crate::backend::traits::{ContentType, Locator};
use crate::codec::base64;
use crate::error::{AppError, Result};

/// Bytes of a generated asset, ready to preview and download
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    bytes: Vec<u8>,
    content_type: ContentType,
}

impl FetchedAsset {
    /// Check the payload is displayable as `content_type` before wrapping it
    pub fn render(bytes: Vec<u8>, content_type: ContentType, locator: &Locator) -> Result<Self> {
        let detected = match content_type {
            ContentType::Banner => detect_image_format(&bytes),
            ContentType::ShortVideo => detect_video_container(&bytes),
        };

        match detected {
            Some(format) => {
                debug!(detected = format, size = bytes.len(), "Asset format recognised");
                Ok(Self { bytes, content_type })
            }
            None => Err(AppError::Render {
                message: format!(
                    "{} bytes are not a recognisable {}",
                    bytes.len(),
                    match content_type {
                        ContentType::Banner => "image",
                        ContentType::ShortVideo => "video",
                    }
                ),
                locator: locator.to_string(),
            }),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.content_type.mime_type()
    }

    pub fn file_name(&self) -> &'static str {
        self.content_type.file_name()
    }

    /// Inline form used for the browser preview and download link
    pub fn to_data_url(&self) -> String {
        base64::create_data_url(&self.bytes, self.mime_type())
    }
}

/// Detect image format from binary data using magic bytes
fn detect_image_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("webp");
    }

    if data.starts_with(b"BM") {
        return Some("bmp");
    }

    None
}

/// Detect a playable video container from magic bytes
fn detect_video_container(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 {
        return None;
    }

    // ISO base media (mp4, mov): box size then "ftyp"
    if &data[4..8] == b"ftyp" {
        return Some("mp4");
    }

    // Matroska / WebM EBML header
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("webm");
    }

    None
}
