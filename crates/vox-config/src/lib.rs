#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod provider;
pub mod server;
pub mod storage;

use serde::Deserialize;

pub use health::*;
pub use provider::*;
pub use server::*;
pub use storage::*;

/// Top-level Vox configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Voice provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Artifact storage and file-serving configuration
    #[serde(default)]
    pub storage: StorageConfig,
}
