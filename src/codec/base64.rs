//! Base64 and data URI helpers

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a bare base64 payload or a `data:` URI back to bytes
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| AppError::InvalidInput("data URI has no payload".to_string()))?,
        None => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::InvalidInput(format!("Invalid base64 data: {}", e)))
}

/// Media type declared by a base64 data URI, e.g. `image/png`
pub fn media_type_of(data_uri: &str) -> Option<&str> {
    let header = data_uri.strip_prefix("data:")?.split_once(',')?.0;
    let media_type = header.strip_suffix(";base64")?;
    if media_type.is_empty() {
        None
    } else {
        Some(media_type)
    }
}

/// Create a base64 data URI for the given media type
pub fn create_data_url(data: &[u8], media_type: &str) -> String {
    format!("data:{};base64,{}", media_type, encode(data))
}
