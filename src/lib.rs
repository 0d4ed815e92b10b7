//! Banner Studio
//!
//! Collects a prompt, a reference image, a content type and an aspect ratio, hands them to a
//! hosted generative model, downloads the resulting video or banner and offers it for download.

pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod response;

pub use error::{AppError, Result};

use std::sync::Arc;
use tracing::error;

use pipeline::Studio;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    /// The studio, or the configuration problem that keeps it from being built
    studio: std::result::Result<Arc<Studio>, String>,
}

impl AppState {
    pub fn new(settings: config::Settings, studio: Result<Studio>) -> Self {
        Self {
            settings: Arc::new(settings),
            studio: studio.map(Arc::new).map_err(|e| e.to_string()),
        }
    }

    /// Build the studio from settings. A configuration problem is logged once and kept so
    /// the server can still answer and report it.
    pub fn from_settings(settings: config::Settings) -> Self {
        let studio = Studio::from_settings(&settings);
        if let Err(e) = &studio {
            error!(error = %e, "Generation disabled until configuration is fixed");
        }
        Self::new(settings, studio)
    }

    pub fn studio(&self) -> Result<Arc<Studio>> {
        self.studio
            .as_ref()
            .map(Arc::clone)
            .map_err(|message| AppError::NotReady(message.clone()))
    }

    /// Configuration problem, if generation is unavailable
    pub fn config_error(&self) -> Option<&str> {
        self.studio.as_ref().err().map(String::as_str)
    }
}
