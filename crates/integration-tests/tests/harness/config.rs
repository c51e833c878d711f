//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use secrecy::SecretString;
use vox_config::{Config, HealthConfig, ProviderConfig, ServerConfig, StorageConfig, TrainingConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config: mock provider, storage rooted in a test directory
    pub fn new(provider_base_url: &str, dir: &Path) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                provider: ProviderConfig {
                    api_key: Some(SecretString::from("test-key")),
                    base_url: Some(provider_base_url.to_owned()),
                    training: TrainingConfig::default(),
                },
                storage: StorageConfig {
                    serve_dir: dir.join("generated"),
                    cache_file: dir.join("voice_models_cache.json"),
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    public_base_url: "http://localhost:8000".to_owned(),
                },
            },
        }
    }

    /// Drop the provider credential
    pub fn without_api_key(mut self) -> Self {
        self.config.provider.api_key = None;
        self
    }

    /// Tighten the training poll for timeout tests
    pub fn with_training(mut self, poll_interval_seconds: u64, timeout_seconds: u64) -> Self {
        self.config.provider.training = TrainingConfig {
            poll_interval_seconds,
            timeout_seconds,
        };
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
