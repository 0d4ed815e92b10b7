//! Replicate prediction API client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::output::PredictionOutput;
use crate::backend::traits::{
    AspectRatio, ContentType, GenerationRequest, Locator, MediaGenerator,
};
use crate::config::{Credentials, GenerationConfig};
use crate::error::{AppError, Result};

/// `owner/name[:version]` model reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn parse(model: &str) -> Result<Self> {
        let invalid = || {
            AppError::Config(config::ConfigError::Message(format!(
                "model '{}' must look like owner/name or owner/name:version",
                model
            )))
        };

        let (path, version) = match model.trim().split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some(_) => return Err(invalid()),
            None => (model.trim(), None),
        };
        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

/// Generation backend talking to the Replicate HTTP API
pub struct ReplicateClient {
    client: Client,
    api_base: String,
    model_id: String,
    model: ModelRef,
    credentials: Credentials,
    poll_interval: Duration,
    timeout: Option<Duration>,
    prefer_wait: bool,
}

/// Model input; field names are the model's contract
#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    text: &'a str,
    image: &'a str,
    menu: ContentType,
    aspect_ratio: AspectRatio,
    api_key_1: &'a str,
    api_key_2: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePredictionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    input: PredictionInput<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    fn is_running(&self) -> bool {
        matches!(self, PredictionStatus::Starting | PredictionStatus::Processing)
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<PredictionOutput>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl Prediction {
    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "no error detail provided".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

impl ReplicateClient {
    /// Create a client; fails before any request when credentials are incomplete
    pub fn new(config: &GenerationConfig, credentials: Credentials) -> Result<Self> {
        credentials.validate()?;
        let model = ModelRef::parse(&config.model)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model_id: config.model.trim().to_string(),
            model,
            credentials,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: config.timeout_secs.map(Duration::from_secs),
            prefer_wait: config.prefer_wait,
        })
    }

    fn create_url(&self) -> String {
        match self.model.version {
            Some(_) => format!("{}/v1/predictions", self.api_base),
            None => format!(
                "{}/v1/models/{}/{}/predictions",
                self.api_base, self.model.owner, self.model.name
            ),
        }
    }

    fn poll_url(&self, prediction: &Prediction) -> String {
        prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/v1/predictions/{}", self.api_base, prediction.id))
    }

    async fn create_prediction(&self, request: &GenerationRequest) -> Result<Prediction> {
        let url = self.create_url();
        let body = CreatePredictionRequest {
            version: self.model.version.as_deref(),
            input: PredictionInput {
                text: &request.prompt,
                image: &request.image,
                menu: request.content_type,
                aspect_ratio: request.aspect_ratio,
                api_key_1: &self.credentials.api_key_1,
                api_key_2: &self.credentials.api_key_2,
            },
        };

        debug!(model = %self.model_id, url = %url, "Creating prediction");

        let mut call = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.replicate_api_token)
            .json(&body);
        if self.prefer_wait {
            call = call.header("Prefer", "wait");
        }

        let response = call
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("request to {} failed: {}", url, e)))?;

        Self::read_prediction(response).await
    }

    async fn get_prediction(&self, url: &str) -> Result<Prediction> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.credentials.replicate_api_token)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("request to {} failed: {}", url, e)))?;

        Self::read_prediction(response).await
    }

    async fn read_prediction(response: Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = %status, error = %e, "Failed to read Replicate error body");
                    String::new()
                }
            };
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail.or(b.title))
                .unwrap_or(body);
            return Err(AppError::Generation(format!(
                "Replicate returned {}: {}",
                status, detail
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse prediction: {}", e)))
    }

    /// Poll until the prediction leaves the starting/processing states
    async fn wait_for_completion(&self, mut prediction: Prediction, started: Instant) -> Result<Prediction> {
        while prediction.status.is_running() {
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    warn!(prediction = %prediction.id, "Prediction exceeded the configured timeout");
                    return Err(AppError::Generation(format!(
                        "prediction {} did not finish within {}s",
                        prediction.id,
                        limit.as_secs()
                    )));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
            let url = self.poll_url(&prediction);
            prediction = self.get_prediction(&url).await?;
            debug!(prediction = %prediction.id, status = ?prediction.status, "Polled prediction");
        }

        Ok(prediction)
    }
}

#[async_trait]
impl MediaGenerator for ReplicateClient {
    fn model(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Locator> {
        let started = Instant::now();
        let prediction = self.create_prediction(&request).await?;
        info!(prediction = %prediction.id, status = ?prediction.status, "Prediction created");

        let prediction = self.wait_for_completion(prediction, started).await?;

        if let (Some(created), Some(completed)) = (prediction.created_at, prediction.completed_at) {
            info!(
                prediction = %prediction.id,
                seconds = (completed - created).num_milliseconds() as f64 / 1000.0,
                "Prediction finished"
            );
        }

        match prediction.status {
            PredictionStatus::Succeeded => prediction
                .output
                .ok_or_else(|| AppError::Generation("model returned no output".to_string()))?
                .into_locator(),
            PredictionStatus::Canceled => Err(AppError::Generation(format!(
                "prediction {} was canceled",
                prediction.id
            ))),
            _ => Err(AppError::Generation(prediction.error_message())),
        }
    }
}
