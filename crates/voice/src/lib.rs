#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod artifacts;
mod cache;
mod error;
mod http_client;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

pub use cache::{ModelCache, ModelEntry};
pub use error::{Result, VoiceError};
pub use server::{Server, VoiceServerBuilder};
pub use types::{CreateModelRequest, CreateModelResponse, SpeechRequest, SpeechResponse};
use request::{ExtractCreateModel, ExtractPayload, ExtractSpeak};

/// Build the voice server from configuration
pub fn build_server(config: &vox_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        VoiceServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize voice server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for the voice relay
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/create-model", post(create_model))
        .route("/generate-speech", post(generate_speech))
        .route("/create-and-speak", post(create_and_speak))
        .route("/models", get(list_models))
}

/// Handle model creation uploads
async fn create_model(
    State(server): State<Arc<Server>>,
    ExtractCreateModel(request): ExtractCreateModel,
) -> Result<(http::StatusCode, Json<types::CreateModelResponse>)> {
    tracing::debug!("create-model handler called for file: {}", request.filename);

    let response = server.create_model(request).await?;

    tracing::debug!("model created: {}", response.model_id);

    Ok((http::StatusCode::CREATED, Json(response)))
}

/// Handle speech synthesis requests
async fn generate_speech(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<types::SpeechRequest>,
) -> Result<(http::StatusCode, Json<types::SpeechResponse>)> {
    let response = server.generate_speech(request).await?;

    tracing::debug!("speech stored as {}", response.filename);

    Ok((http::StatusCode::CREATED, Json(response)))
}

/// Handle the combined create-and-speak flow
async fn create_and_speak(
    State(server): State<Arc<Server>>,
    ExtractSpeak(request): ExtractSpeak,
) -> Result<axum::response::Response> {
    tracing::debug!("create-and-speak handler called for file: {}", request.filename);

    let attachment = server.create_and_speak(request).await?;

    Ok(attachment.into_response())
}

/// Dump the model cache
async fn list_models(
    State(server): State<Arc<Server>>,
) -> Result<Json<indexmap::IndexMap<String, ModelEntry>>> {
    Ok(Json(server.models().await?))
}
