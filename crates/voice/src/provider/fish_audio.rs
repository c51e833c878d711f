use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::VoiceError,
    http_client::http_client,
    types::{CreateModelRequest, ModelInfo},
};

use super::VoiceProvider;

const DEFAULT_FISH_AUDIO_API_URL: &str = "https://api.fish.audio";

/// Fish Audio voice-clone provider
pub struct FishAudioProvider {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl FishAudioProvider {
    pub fn new(api_key: Option<SecretString>, base_url: Option<String>) -> Self {
        let client = http_client();
        let base_url = base_url.unwrap_or_else(|| DEFAULT_FISH_AUDIO_API_URL.to_string());

        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn bearer(&self) -> crate::error::Result<String> {
        self.api_key
            .as_ref()
            .map(|key| format!("Bearer {}", key.expose_secret()))
            .ok_or_else(|| VoiceError::Config("API key not configured".to_string()))
    }
}

#[derive(serde::Deserialize)]
struct CreatedModel {
    #[serde(rename = "_id")]
    id: String,
    state: Option<String>,
}

#[derive(serde::Deserialize)]
struct ModelStatus {
    state: String,
}

#[derive(serde::Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    reference_id: &'a str,
}

/// Read a non-success response's body as the error message
async fn provider_error(response: reqwest::Response) -> VoiceError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!("Fish Audio API error ({status}): {message}");

    VoiceError::ProviderApi { status, message }
}

#[async_trait]
impl VoiceProvider for FishAudioProvider {
    async fn create_model(&self, request: CreateModelRequest) -> crate::error::Result<ModelInfo> {
        let url = format!("{}/model", self.base_url);

        tracing::debug!(
            "Fish Audio model creation: {} ({} bytes), train_mode={}",
            request.filename,
            request.audio.len(),
            request.train_mode,
        );

        let form = reqwest::multipart::Form::new()
            .text("visibility", request.visibility)
            .text("type", "tts")
            .text("title", request.title)
            .text("description", request.description)
            .text("train_mode", request.train_mode)
            .text("tags", request.tags)
            .text("enhance_audio_quality", request.enhance_audio_quality)
            .part(
                "voices",
                reqwest::multipart::Part::bytes(request.audio)
                    .file_name(request.filename)
                    .mime_str(&request.content_type)
                    .map_err(|e| VoiceError::InvalidRequest(format!("Invalid content type: {e}")))?,
            );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer()?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Fish Audio model creation failed: {e}");
                VoiceError::Connection(format!("Failed to send request to Fish Audio: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let created: CreatedModel = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Fish Audio model response: {e}");
            VoiceError::Internal(None)
        })?;

        tracing::debug!("Fish Audio model created: {}", created.id);

        Ok(ModelInfo {
            model_id: created.id,
            state: created.state,
        })
    }

    async fn synthesize(&self, text: &str, reference_id: &str) -> crate::error::Result<Vec<u8>> {
        let url = format!("{}/v1/tts", self.base_url);

        tracing::debug!(
            "Fish Audio TTS request: reference_id={reference_id}, text_len={}",
            text.len(),
        );

        let body = TtsRequest { text, reference_id };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Fish Audio TTS request failed: {e}");
                VoiceError::Connection(format!("Failed to send request to Fish Audio: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read Fish Audio response body: {e}");
            VoiceError::Internal(None)
        })?;

        tracing::debug!("Fish Audio synthesis complete, {} bytes", audio.len());

        Ok(audio.to_vec())
    }

    async fn model_state(&self, model_id: &str) -> crate::error::Result<String> {
        let url = format!("{}/model/{model_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer()?)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Fish Audio model status request failed: {e}");
                VoiceError::Connection(format!("Failed to send request to Fish Audio: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let status: ModelStatus = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Fish Audio model status: {e}");
            VoiceError::Internal(None)
        })?;

        Ok(status.state)
    }
}
