use std::path::PathBuf;

use crate::error::VoiceError;

/// Stored artifact described back to the caller
#[derive(Debug)]
pub struct StoredArtifact {
    pub filename: String,
    pub size_bytes: u64,
    pub audio_url: String,
}

/// Writes generated audio into the serving directory
///
/// Artifact identity is the filename alone; existence on disk is the only
/// state kept.
pub struct ArtifactStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf, public_base_url: &str) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store synthesized audio under `{reference_id}_{yyyyMMddHHmmss}.mp3`
    ///
    /// A file already present under the computed name is treated as already
    /// satisfied: the write is skipped and the existing file's size is
    /// reported, so at most one generation per model per second lands on disk.
    pub async fn store(&self, reference_id: &str, audio: &[u8]) -> crate::error::Result<StoredArtifact> {
        let filename = artifact_filename(reference_id, &jiff::Zoned::now());
        let path = self.dir.join(&filename);

        let size_bytes = write_if_absent(&path, audio).await.map_err(|e| {
            tracing::error!("Failed to store artifact {filename}: {e}");
            VoiceError::Internal(Some(format!("failed to store audio: {e}")))
        })?;

        let audio_url = format!("{}/{filename}", self.public_base_url);

        Ok(StoredArtifact {
            filename,
            size_bytes,
            audio_url,
        })
    }
}

fn artifact_filename(reference_id: &str, now: &jiff::Zoned) -> String {
    format!("{reference_id}_{}.mp3", now.strftime("%Y%m%d%H%M%S"))
}

/// Write `audio` to `path` unless the file exists; either way return the
/// on-disk size
async fn write_if_absent(path: &std::path::Path, audio: &[u8]) -> std::io::Result<u64> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, audio).await?;
    }

    Ok(tokio::fs::metadata(path).await?.len())
}
