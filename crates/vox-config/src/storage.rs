use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Artifact storage and static file-serving configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory generated audio is written to and served from
    #[serde(default = "default_serve_dir")]
    pub serve_dir: PathBuf,
    /// Path of the model cache document
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Listen address of the static file server
    pub listen_address: Option<SocketAddr>,
    /// External base URL generated audio is reachable under
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            serve_dir: default_serve_dir(),
            cache_file: default_cache_file(),
            listen_address: None,
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_serve_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("voice_models_cache.json")
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}
