//! Common error types for the studio

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required secrets: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),

    #[error("Generation is unavailable: {0}")]
    NotReady(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Download failed (status code: {status}). Check the URL directly: {locator}")]
    FetchStatus { status: u16, locator: String },

    #[error("Download failed: {message}. Check the URL directly: {locator}")]
    FetchTransport { message: String, locator: String },

    #[error("Could not display the result: {message}. Check the URL directly: {locator}")]
    Render { message: String, locator: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification the presentation layer renders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    Generation,
    Fetch,
    Render,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Input => "invalid_request_error",
            ErrorKind::Generation => "generation_error",
            ErrorKind::Fetch => "fetch_error",
            ErrorKind::Render => "render_error",
            ErrorKind::Internal => "server_error",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) | AppError::MissingSecrets(_) | AppError::NotReady(_) => {
                ErrorKind::Configuration
            }
            AppError::InvalidInput(_) | AppError::Encoding(_) => ErrorKind::Input,
            AppError::Generation(_) => ErrorKind::Generation,
            AppError::FetchStatus { .. } | AppError::FetchTransport { .. } => ErrorKind::Fetch,
            AppError::Render { .. } => ErrorKind::Render,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The literal asset URL, for errors raised after generation succeeded
    pub fn locator(&self) -> Option<&str> {
        match self {
            AppError::FetchStatus { locator, .. }
            | AppError::FetchTransport { locator, .. }
            | AppError::Render { locator, .. } => Some(locator),
            _ => None,
        }
    }

    /// HTTP status returned by the asset host, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::FetchStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
            AppError::MissingSecrets(_) => (StatusCode::SERVICE_UNAVAILABLE, Some("missing_secrets")),
            AppError::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, Some("not_configured")),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Encoding(_) => (StatusCode::UNPROCESSABLE_ENTITY, Some("unsupported_image")),
            AppError::Generation(_) => (StatusCode::BAD_GATEWAY, None),
            AppError::FetchStatus { .. } => (StatusCode::BAD_GATEWAY, Some("download_failed")),
            AppError::FetchTransport { .. } => (StatusCode::BAD_GATEWAY, Some("download_failed")),
            AppError::Render { .. } => (StatusCode::BAD_GATEWAY, Some("unrenderable_asset")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: self.kind().as_str().to_string(),
                code: code.map(|c| c.to_string()),
                status_code: self.upstream_status(),
                locator: self.locator().map(str::to_string),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
