use serde::{Deserialize, Serialize};

/// Defaults applied to model creation when a field is not supplied
pub const DEFAULT_TITLE: &str = "streamer-audio";
pub const DEFAULT_DESCRIPTION: &str = "VoiceModel";
pub const DEFAULT_VISIBILITY: &str = "unlist";
pub const DEFAULT_TRAIN_MODE: &str = "fast";
pub const DEFAULT_TAGS: &str = "voice";
pub const DEFAULT_ENHANCE_AUDIO: &str = "false";

/// Model creation request forwarded to the provider
#[derive(Debug)]
pub struct CreateModelRequest {
    /// Raw voice sample
    pub audio: Vec<u8>,
    /// Original filename of the uploaded sample; also the cache key
    pub filename: String,
    /// Content type of the sample
    pub content_type: String,
    pub title: String,
    pub description: String,
    /// public/unlist/private
    pub visibility: String,
    /// fast/slow
    pub train_mode: String,
    /// Comma-separated tags
    pub tags: String,
    /// "true"/"false", forwarded verbatim
    pub enhance_audio_quality: String,
}

impl CreateModelRequest {
    /// Request with every optional field at its default
    pub fn with_defaults(audio: Vec<u8>, filename: String, content_type: String) -> Self {
        Self {
            audio,
            filename,
            content_type,
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            visibility: DEFAULT_VISIBILITY.to_string(),
            train_mode: DEFAULT_TRAIN_MODE.to_string(),
            tags: DEFAULT_TAGS.to_string(),
            enhance_audio_quality: DEFAULT_ENHANCE_AUDIO.to_string(),
        }
    }
}

/// Provider-assigned identity of a created model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Opaque identifier assigned by the provider
    pub model_id: String,
    /// Provider-reported training state, when present
    pub state: Option<String>,
}

/// Response body of a successful model creation
#[derive(Debug, Serialize)]
pub struct CreateModelResponse {
    pub success: bool,
    pub model_id: String,
    pub state: Option<String>,
    pub title: String,
    pub message: String,
}

/// Speech synthesis request body
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Text to synthesize
    #[serde(default)]
    pub text: Option<String>,
    /// Model identifier to synthesize with
    #[serde(default)]
    pub reference_id: Option<String>,
}

/// Response body describing a stored audio artifact
#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub filename: String,
    pub mime: String,
    pub size_bytes: u64,
    pub audio_url: String,
}

/// Combined create-and-speak request
#[derive(Debug)]
pub struct CreateAndSpeakRequest {
    pub audio: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub text: String,
    pub title: Option<String>,
}

/// Synthesized audio returned as a downloadable attachment
pub struct AudioAttachment {
    /// Model the audio was synthesized with; names the download
    pub model_id: String,
    /// Raw audio bytes
    pub audio: Vec<u8>,
}

impl AudioAttachment {
    /// Convert into an axum HTTP response with attachment disposition
    pub fn into_response(self) -> axum::response::Response {
        let disposition = format!("attachment; filename=\"{}.mp3\"", self.model_id);

        axum::response::Response::builder()
            .header(http::header::CONTENT_TYPE, "audio/mpeg")
            .header(http::header::CONTENT_DISPOSITION, disposition)
            .body(axum::body::Body::from(self.audio))
            .unwrap_or_else(|_| {
                axum::response::Response::builder()
                    .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::empty())
                    .unwrap()
            })
    }
}
