//! Route handlers

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::{form, page};
use crate::error::Result;
use crate::AppState;

/// Successful generation, with the asset inlined for preview and download
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub request_id: String,
    pub locator: String,
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub data_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page::render(state.config_error()))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let error = state.config_error().map(str::to_string);
    Json(HealthResponse {
        status: if error.is_none() { "ok" } else { "misconfigured" },
        model: state.settings.generation.model.clone(),
        error,
    })
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>> {
    let studio = state.studio()?;
    let submission = form::read_submission(multipart).await?;
    let generated = studio.run(submission).await?;

    Ok(Json(GenerateResponse {
        request_id: generated.request_id.to_string(),
        file_name: generated.asset.file_name(),
        mime_type: generated.asset.mime_type(),
        data_url: generated.asset.to_data_url(),
        locator: generated.locator.into_string(),
    }))
}
