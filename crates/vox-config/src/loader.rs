use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the training poll settings or the public base
    /// URL are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.training.poll_interval_seconds == 0 {
            anyhow::bail!("provider.training.poll_interval_seconds must be greater than 0");
        }

        if self.provider.training.timeout_seconds == 0 {
            anyhow::bail!("provider.training.timeout_seconds must be greater than 0");
        }

        if self.storage.public_base_url.trim().is_empty() {
            anyhow::bail!("storage.public_base_url must not be empty");
        }

        Ok(())
    }
}
