//! Common traits and types for the generation backend

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::codec::base64;
use crate::error::{AppError, Result};

/// What the model should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    ShortVideo,
    Banner,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::ShortVideo, ContentType::Banner];

    /// Label the model expects in its `menu` field
    pub fn menu_label(&self) -> &'static str {
        match self {
            ContentType::ShortVideo => "Short video",
            ContentType::Banner => "Banner",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentType::ShortVideo => "video/mp4",
            ContentType::Banner => "image/png",
        }
    }

    /// Fixed name offered for the download
    pub fn file_name(&self) -> &'static str {
        match self {
            ContentType::ShortVideo => "generated_video.mp4",
            ContentType::Banner => "generated_banner.png",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.menu_label())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|content_type| content_type.menu_label() == label)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown menu '{}'; expected 'Short video' or 'Banner'",
                    label
                ))
            })
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.menu_label())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}

/// Output framing passed through to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Vertical,
    Square,
    Horizontal,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Vertical => "vertical",
            AspectRatio::Square => "square",
            AspectRatio::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "vertical" => Ok(AspectRatio::Vertical),
            "square" => Ok(AspectRatio::Square),
            "horizontal" => Ok(AspectRatio::Horizontal),
            other => Err(AppError::InvalidInput(format!(
                "unknown aspect ratio '{}'; expected vertical, square or horizontal",
                other
            ))),
        }
    }
}

/// Request to generate a video or banner
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Free-text prompt; may be empty
    pub prompt: String,

    /// Reference image as a base64 data URI
    pub image: String,

    pub content_type: ContentType,

    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Build a request, rejecting images that have not been encoded yet
    pub fn new(
        prompt: impl Into<String>,
        image: String,
        content_type: ContentType,
        aspect_ratio: AspectRatio,
    ) -> Result<Self> {
        if image.is_empty() {
            return Err(AppError::InvalidInput("image is required".to_string()));
        }
        if base64::media_type_of(&image).is_none() {
            return Err(AppError::InvalidInput(
                "image must be a base64 data URI".to_string(),
            ));
        }

        Ok(Self {
            prompt: prompt.into(),
            image,
            content_type,
            aspect_ratio,
        })
    }
}

/// URL of a generated asset that still has to be downloaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for media generation backends
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    /// Identifier of the model requests are sent to
    fn model(&self) -> &str;

    /// Run one generation to completion and return the locator of its output
    async fn generate(&self, request: GenerationRequest) -> Result<Locator>;
}
