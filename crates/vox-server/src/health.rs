use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

/// Health payload: reports whether the provider credential is configured,
/// never whether it is valid
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    api_key_set: bool,
}

/// Health check handler
pub async fn health_handler(State(api_key_set): State<bool>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        api_key_set,
    })
}
