//! One submission from upload to downloadable asset

use std::fmt;
use std::sync::Arc;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::backend::replicate::ReplicateClient;
use crate::backend::traits::{AspectRatio, ContentType, GenerationRequest, Locator, MediaGenerator};
use crate::codec::raster;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::response::{FetchedAsset, ResultFetcher};

/// Progress of a submission, as logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submitted,
    AwaitingResult,
    Fetching,
    Rendering,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Submitted => "submitted",
            Stage::AwaitingResult => "awaiting_result",
            Stage::Fetching => "fetching",
            Stage::Rendering => "rendering",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        })
    }
}

/// Form input for one generation
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub prompt: String,
    /// Raw bytes of the uploaded file, if one was chosen
    pub image: Option<Vec<u8>>,
    pub content_type: ContentType,
    pub aspect_ratio: AspectRatio,
}

/// Finished submission
#[derive(Debug, Clone)]
pub struct GeneratedAsset {
    pub request_id: Uuid,
    pub locator: Locator,
    pub asset: FetchedAsset,
}

/// Encodes, generates, downloads and checks one asset per call
pub struct Studio {
    generator: Arc<dyn MediaGenerator>,
    fetcher: ResultFetcher,
}

impl Studio {
    pub fn new(generator: Arc<dyn MediaGenerator>, fetcher: ResultFetcher) -> Self {
        Self { generator, fetcher }
    }

    /// Build the Replicate-backed studio; fails when secrets or model are invalid
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let generator = ReplicateClient::new(&settings.generation, settings.secrets.clone())?;
        let fetcher = ResultFetcher::new(&settings.fetch)?;
        Ok(Self::new(Arc::new(generator), fetcher))
    }

    pub async fn run(&self, submission: Submission) -> Result<GeneratedAsset> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "generation",
            request_id = %request_id,
            menu = %submission.content_type,
            aspect_ratio = %submission.aspect_ratio,
        );

        async move {
            let result = self.run_stages(request_id, submission).await;
            match &result {
                Ok(generated) => info!(stage = %Stage::Completed, locator = %generated.locator, "Generation complete"),
                Err(e) => error!(stage = %Stage::Failed, kind = e.kind().as_str(), error = %e, "Generation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, request_id: Uuid, submission: Submission) -> Result<GeneratedAsset> {
        let Submission {
            prompt,
            image,
            content_type,
            aspect_ratio,
        } = submission;

        let upload = image
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Please upload an image.".to_string()))?;

        info!(stage = %Stage::Submitted, upload_bytes = upload.len(), "Generation submitted");
        let encoded = raster::encode_data_uri(&raster::load_upload(&upload)?)?;
        let request = GenerationRequest::new(prompt, encoded, content_type, aspect_ratio)?;

        info!(stage = %Stage::AwaitingResult, model = self.generator.model(), "Waiting for the model");
        let locator = self.generator.generate(request).await?;

        info!(stage = %Stage::Fetching, locator = %locator, "Downloading result");
        let bytes = self.fetcher.fetch(&locator).await?;

        info!(stage = %Stage::Rendering, size = bytes.len(), "Checking result");
        let asset = FetchedAsset::render(bytes, content_type, &locator)?;

        Ok(GeneratedAsset {
            request_id,
            locator,
            asset,
        })
    }
}
