use std::time::Duration;

use crate::{
    artifacts::ArtifactStore,
    cache::{ModelCache, ModelEntry},
    error::VoiceError,
    provider::{VoiceProvider, fish_audio::FishAudioProvider},
    types::{
        AudioAttachment, CreateAndSpeakRequest, CreateModelRequest, CreateModelResponse, ModelInfo,
        SpeechRequest, SpeechResponse,
    },
};

/// Any synthesis body below this size is not plausible audio
const MIN_AUDIO_BYTES: usize = 1000;

/// Provider-reported state that ends the training wait
const STATE_TRAINED: &str = "trained";

/// Provider-reported state that fails the training wait
const STATE_FAILED: &str = "failed";

/// Voice relay server: provider calls, model cache, artifact storage
pub struct Server {
    provider: Box<dyn VoiceProvider>,
    cache: ModelCache,
    artifacts: ArtifactStore,
    poll_interval: Duration,
    training_timeout: Duration,
}

impl Server {
    /// Create a model from an uploaded sample and record it in the cache
    ///
    /// Always creates: the cache is written, never consulted, on this path.
    pub async fn create_model(&self, request: CreateModelRequest) -> crate::error::Result<CreateModelResponse> {
        let cache_key = request.filename.clone();
        let title = request.title.clone();

        let info = self.provider.create_model(request).await?;

        let entry = ModelEntry::new(info.model_id.clone(), title.clone(), info.state.clone());
        self.cache.insert(cache_key, entry).await?;

        Ok(CreateModelResponse {
            success: true,
            model_id: info.model_id,
            state: info.state,
            title,
            message: "Model created successfully".to_string(),
        })
    }

    /// Synthesize speech from an existing model and store the artifact
    pub async fn generate_speech(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse> {
        let (text, reference_id) = match (
            request.text.filter(|t| !t.is_empty()),
            request.reference_id.filter(|r| !r.is_empty()),
        ) {
            (Some(text), Some(reference_id)) => (text, reference_id),
            _ => {
                return Err(VoiceError::InvalidRequest("Missing text or reference_id".to_string()));
            }
        };

        let audio = self.synthesize_checked(&text, &reference_id).await?;

        let artifact = self.artifacts.store(&reference_id, &audio).await?;

        Ok(SpeechResponse {
            filename: artifact.filename,
            mime: "audio/mpeg".to_string(),
            size_bytes: artifact.size_bytes,
            audio_url: artifact.audio_url,
        })
    }

    /// Create a model, wait for training, synthesize, return the audio
    ///
    /// The model is created with fixed defaults for the fields this endpoint
    /// does not expose, and the cache is bypassed entirely.
    pub async fn create_and_speak(&self, request: CreateAndSpeakRequest) -> crate::error::Result<AudioAttachment> {
        let mut create = CreateModelRequest::with_defaults(request.audio, request.filename, request.content_type);
        if let Some(title) = request.title {
            create.title = title;
        }

        let info = self.provider.create_model(create).await?;

        self.wait_until_trained(&info).await?;

        let audio = self.synthesize_checked(&request.text, &info.model_id).await?;

        Ok(AudioAttachment {
            model_id: info.model_id,
            audio,
        })
    }

    /// Full contents of the model cache
    pub async fn models(&self) -> crate::error::Result<indexmap::IndexMap<String, ModelEntry>> {
        self.cache.dump().await
    }

    /// Handle to the model cache (batch flows reuse entries through it)
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Provider call with the implausibly-small-body guard applied
    pub async fn synthesize_checked(&self, text: &str, reference_id: &str) -> crate::error::Result<Vec<u8>> {
        let audio = self.provider.synthesize(text, reference_id).await?;

        if audio.len() < MIN_AUDIO_BYTES {
            return Err(VoiceError::InvalidAudioResponse(
                String::from_utf8_lossy(&audio).into_owned(),
            ));
        }

        Ok(audio)
    }

    /// Poll the provider's training state until the model is usable
    async fn wait_until_trained(&self, info: &ModelInfo) -> crate::error::Result<()> {
        if info.state.as_deref() == Some(STATE_TRAINED) {
            return Ok(());
        }

        let started = tokio::time::Instant::now();

        loop {
            let state = self.provider.model_state(&info.model_id).await?;

            match state.as_str() {
                STATE_TRAINED => {
                    tracing::debug!("model {} trained after {:?}", info.model_id, started.elapsed());
                    return Ok(());
                }
                STATE_FAILED => {
                    return Err(VoiceError::TrainingFailed(info.model_id.clone()));
                }
                other => {
                    tracing::debug!("model {} still {other}", info.model_id);
                }
            }

            if started.elapsed() + self.poll_interval > self.training_timeout {
                return Err(VoiceError::TrainingTimeout {
                    model_id: info.model_id.clone(),
                    waited_seconds: self.training_timeout.as_secs(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Builder for constructing the voice server from configuration
pub struct VoiceServerBuilder<'a> {
    config: &'a vox_config::Config,
}

impl<'a> VoiceServerBuilder<'a> {
    pub const fn new(config: &'a vox_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let provider_config = &self.config.provider;

        if !provider_config.api_key_set() {
            tracing::warn!("no provider API key configured; provider calls will fail");
        }

        let api_key = provider_config
            .api_key_set()
            .then(|| provider_config.api_key.clone())
            .flatten();

        let provider = FishAudioProvider::new(api_key, provider_config.base_url.clone());

        let storage = &self.config.storage;
        let cache = ModelCache::open(&storage.cache_file)
            .map_err(|e| VoiceError::Internal(Some(e.to_string())))?;
        let artifacts = ArtifactStore::new(storage.serve_dir.clone(), &storage.public_base_url);

        Ok(Server {
            provider: Box::new(provider),
            cache,
            artifacts,
            poll_interval: Duration::from_secs(provider_config.training.poll_interval_seconds),
            training_timeout: Duration::from_secs(provider_config.training.timeout_seconds),
        })
    }
}
