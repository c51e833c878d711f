//! Mock Fish Audio backend for integration tests
//!
//! Implements the three provider endpoints the relay calls: model creation
//! (multipart), model status, and synthesis.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Mock provider that returns predictable responses
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    model_count: AtomicU32,
    status_count: AtomicU32,
    tts_count: AtomicU32,
    /// State reported by the status endpoint
    poll_state: &'static str,
    /// Synthesis response body
    audio: Vec<u8>,
}

impl MockProvider {
    /// Mock that trains on the first poll and returns plausible audio
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner("trained", vec![0x55; 2000]).await
    }

    /// Mock whose models never leave the training state
    pub async fn start_never_training() -> anyhow::Result<Self> {
        Self::start_inner("training", vec![0x55; 2000]).await
    }

    /// Mock whose synthesis endpoint returns the given body
    pub async fn start_with_audio(audio: Vec<u8>) -> anyhow::Result<Self> {
        Self::start_inner("trained", audio).await
    }

    async fn start_inner(poll_state: &'static str, audio: Vec<u8>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            model_count: AtomicU32::new(0),
            status_count: AtomicU32::new(0),
            tts_count: AtomicU32::new(0),
            poll_state,
            audio,
        });

        let app = Router::new()
            .route("/model", routing::post(handle_create_model))
            .route("/model/{id}", routing::get(handle_model_status))
            .route("/v1/tts", routing::post(handle_tts))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the provider
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of model creation requests received
    pub fn model_count(&self) -> u32 {
        self.state.model_count.load(Ordering::Relaxed)
    }

    /// Number of status polls received
    pub fn status_count(&self) -> u32 {
        self.state.status_count.load(Ordering::Relaxed)
    }

    /// Number of synthesis requests received
    pub fn tts_count(&self) -> u32 {
        self.state.tts_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_create_model(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> impl IntoResponse {
    let mut has_voices = false;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("voices") {
            has_voices = field.bytes().await.is_ok();
        } else {
            field.text().await.ok();
        }
    }

    if !has_voices {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"detail": "voices part missing"})),
        );
    }

    let n = state.model_count.fetch_add(1, Ordering::Relaxed) + 1;

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "_id": format!("model-{n:04}"),
            "state": "training",
        })),
    )
}

async fn handle_model_status(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.status_count.fetch_add(1, Ordering::Relaxed);

    Json(serde_json::json!({
        "_id": id,
        "state": state.poll_state,
    }))
}

async fn handle_tts(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.tts_count.fetch_add(1, Ordering::Relaxed);

    (
        [(axum::http::header::CONTENT_TYPE, "audio/mpeg")],
        state.audio.clone(),
    )
}
