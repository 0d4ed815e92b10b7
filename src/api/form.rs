//! Multipart form intake

use axum::extract::Multipart;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::pipeline::Submission;

/// Read `text`, `image`, `menu` and `aspect_ratio` fields into a submission.
///
/// An empty file part (browsers send one when nothing was chosen) counts as no image.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => submission.prompt = field.text().await.map_err(malformed)?,
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                debug!(file_name = ?file_name, size = bytes.len(), "Received upload");
                submission.image = if bytes.is_empty() {
                    None
                } else {
                    Some(bytes.to_vec())
                };
            }
            "menu" => submission.content_type = field.text().await.map_err(malformed)?.parse()?,
            "aspect_ratio" => {
                submission.aspect_ratio = field.text().await.map_err(malformed)?.parse()?
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::InvalidInput(format!("malformed form data: {}", e))
}
