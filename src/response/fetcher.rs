//! Download of generated assets

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::traits::Locator;
use crate::config::FetchConfig;
use crate::error::{AppError, Result};

/// Performs the single GET against a generation locator
pub struct ResultFetcher {
    client: Client,
}

impl ResultFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Return the body when the asset host answers 200; anything else keeps the locator
    /// so the user can retrieve it by hand.
    pub async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>> {
        let transport = |e: reqwest::Error| AppError::FetchTransport {
            message: e.to_string(),
            locator: locator.to_string(),
        };

        let response = self
            .client
            .get(locator.as_str())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(locator = %locator, status = %status, "Asset download failed");
            return Err(AppError::FetchStatus {
                status: status.as_u16(),
                locator: locator.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        debug!(locator = %locator, size = bytes.len(), "Downloaded asset");
        Ok(bytes.to_vec())
    }
}
