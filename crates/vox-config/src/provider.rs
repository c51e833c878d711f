use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Voice provider (Fish Audio) configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key forwarded as a bearer credential on every provider call
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Training poll behavior for the combined create-and-speak flow
    #[serde(default)]
    pub training: TrainingConfig,
}

impl ProviderConfig {
    /// Whether a non-empty API key is configured
    ///
    /// An empty string counts as unset so that
    /// `{{ env.VOX_API_KEY | default("") }}` config files load without the
    /// variable present.
    pub fn api_key_set(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

/// Poll interval and bound for waiting on model training
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            timeout_seconds: default_timeout(),
        }
    }
}

const fn default_poll_interval() -> u64 {
    5
}

const fn default_timeout() -> u64 {
    180
}
