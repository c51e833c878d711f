use axum::body::Body;
use axum::extract::FromRequest;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::{
    error::error_response,
    types::{CreateAndSpeakRequest, CreateModelRequest},
};

/// Body limit for voice sample uploads (32 MiB)
const UPLOAD_LIMIT_BYTES: usize = 32 << 20;

/// Body limit for JSON requests (1 MiB)
const JSON_LIMIT_BYTES: usize = 1 << 20;

static APPLICATION_JSON: http::HeaderValue = http::HeaderValue::from_static("application/json");

/// Extractor for model creation uploads
pub struct ExtractCreateModel(pub CreateModelRequest);

/// Extractor for the combined create-and-speak upload
pub struct ExtractSpeak(pub CreateAndSpeakRequest);

/// Extractor for JSON request bodies
pub struct ExtractPayload<T>(pub T);

/// The `voices` file part plus the form's text fields
struct VoiceForm {
    audio: Option<Vec<u8>>,
    filename: String,
    content_type: String,
    fields: IndexMap<String, String>,
}

impl VoiceForm {
    fn field(&self, name: &str, default: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_else(|| default.to_string())
    }

    /// The `voices` part, required on every upload endpoint
    fn require_audio(self) -> Result<(Vec<u8>, String, String), axum::response::Response> {
        let Some(audio) = self.audio else {
            return Err(error_response(
                axum::http::StatusCode::BAD_REQUEST,
                "No voice file provided",
            ));
        };
        Ok((audio, self.filename, self.content_type))
    }
}

/// Read a multipart body into a [`VoiceForm`]
///
/// Verifies the content type, applies the upload body limit, then walks the
/// fields collecting the `voices` file part and every text field.
async fn read_voice_form(request: http::Request<Body>) -> Result<VoiceForm, axum::response::Response> {
    let (parts, body) = request.into_parts();

    let content_type = parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("multipart/form-data") {
        return Err(error_response(
            axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported Content-Type, expected: 'Content-Type: multipart/form-data'",
        ));
    }

    let bytes = axum::body::to_bytes(body, UPLOAD_LIMIT_BYTES).await.map_err(|err| {
        error_response(
            axum::http::StatusCode::BAD_REQUEST,
            format!("Failed to read request body: {err}"),
        )
    })?;

    // Reassemble the request for multipart parsing
    let mut rebuilt = http::Request::builder().method(parts.method.clone()).uri(parts.uri.clone());

    for (key, value) in &parts.headers {
        rebuilt = rebuilt.header(key, value);
    }

    let rebuilt = rebuilt.body(Body::from(bytes)).map_err(|e| {
        error_response(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to rebuild request: {e}"),
        )
    })?;

    let mut multipart = axum::extract::Multipart::from_request(rebuilt, &()).await.map_err(|e| {
        error_response(
            axum::http::StatusCode::BAD_REQUEST,
            format!("Failed to parse multipart form: {e}"),
        )
    })?;

    let mut form = VoiceForm {
        audio: None,
        filename: String::from("voice.mp3"),
        content_type: String::from("audio/mpeg"),
        fields: IndexMap::new(),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "voices" {
            if let Some(name) = field.file_name() {
                form.filename = name.to_string();
            }
            if let Some(ct) = field.content_type() {
                form.content_type = ct.to_string();
            }
            form.audio = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        error_response(
                            axum::http::StatusCode::BAD_REQUEST,
                            format!("Failed to read voice data: {e}"),
                        )
                    })?
                    .to_vec(),
            );
        } else if !field_name.is_empty() {
            let value = field.text().await.map_err(|e| {
                error_response(
                    axum::http::StatusCode::BAD_REQUEST,
                    format!("Failed to read {field_name} field: {e}"),
                )
            })?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

impl<S> axum::extract::FromRequest<S> for ExtractCreateModel
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        use crate::types;

        let form = read_voice_form(request).await?;

        let title = form.field("title", types::DEFAULT_TITLE);
        let description = form.field("description", types::DEFAULT_DESCRIPTION);
        let visibility = form.field("visibility", types::DEFAULT_VISIBILITY);
        let train_mode = form.field("train_mode", types::DEFAULT_TRAIN_MODE);
        let tags = form.field("tags", types::DEFAULT_TAGS);
        let enhance_audio_quality = form.field("enhance_audio_quality", types::DEFAULT_ENHANCE_AUDIO);

        let (audio, filename, content_type) = form.require_audio()?;

        Ok(Self(CreateModelRequest {
            audio,
            filename,
            content_type,
            title,
            description,
            visibility,
            train_mode,
            tags,
            enhance_audio_quality,
        }))
    }
}

impl<S> axum::extract::FromRequest<S> for ExtractSpeak
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let form = read_voice_form(request).await?;

        let text = form.fields.get("text").cloned();
        let title = form.fields.get("title").cloned();

        let (audio, filename, content_type) = form.require_audio()?;

        let text = match text.filter(|t| !t.is_empty()) {
            Some(text) => text,
            None => {
                return Err(error_response(
                    axum::http::StatusCode::BAD_REQUEST,
                    "No text provided",
                ));
            }
        };

        Ok(Self(CreateAndSpeakRequest {
            audio,
            filename,
            content_type,
            text,
            title,
        }))
    }
}

impl<S, T: DeserializeOwned> axum::extract::FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .is_none_or(|value| value != APPLICATION_JSON)
        {
            return Err(error_response(
                axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: application/json'",
            ));
        }

        let bytes = axum::body::to_bytes(body, JSON_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
            {
                error_response(
                    axum::http::StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body is too large, limit is {JSON_LIMIT_BYTES} bytes"),
                )
            } else {
                error_response(
                    axum::http::StatusCode::BAD_REQUEST,
                    format!("Failed to read request body: {err}"),
                )
            }
        })?;

        let body = serde_json::from_slice::<T>(&bytes).map_err(|e| {
            error_response(
                axum::http::StatusCode::BAD_REQUEST,
                format!("Failed to parse request body: {e}"),
            )
        })?;

        Ok(Self(body))
    }
}
