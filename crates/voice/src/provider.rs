pub mod fish_audio;

use async_trait::async_trait;

use crate::types::{CreateModelRequest, ModelInfo};

/// Trait for voice-clone provider implementations
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Create a synthetic-voice model from an uploaded sample
    async fn create_model(&self, request: CreateModelRequest) -> crate::error::Result<ModelInfo>;

    /// Synthesize speech audio from a previously created model
    async fn synthesize(&self, text: &str, reference_id: &str) -> crate::error::Result<Vec<u8>>;

    /// Fetch the provider-reported training state of a model
    async fn model_state(&self, model_id: &str) -> crate::error::Result<String>;
}
