use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::VoiceError;

/// Local record linking an uploaded source filename to a provider model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Provider-assigned model identifier
    pub model_id: String,
    /// Display title the model was created with
    pub title: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// Provider-reported training state at creation time
    #[serde(default)]
    pub state: Option<String>,
}

impl ModelEntry {
    /// Entry stamped with the current time
    pub fn new(model_id: String, title: String, state: Option<String>) -> Self {
        Self {
            model_id,
            title,
            created_at: jiff::Timestamp::now().to_string(),
            state,
        }
    }
}

type Entries = IndexMap<String, ModelEntry>;

enum Command {
    Get {
        key: String,
        reply: oneshot::Sender<Option<ModelEntry>>,
    },
    Insert {
        key: String,
        entry: ModelEntry,
        reply: oneshot::Sender<std::io::Result<()>>,
    },
    Dump {
        reply: oneshot::Sender<Entries>,
    },
}

/// Durable filename → model mapping, owned by a single writer task
///
/// All access goes through a command channel, so concurrent creations can
/// never lose each other's updates. The whole map is persisted on every
/// mutation; entries are never deleted, and a later creation for the same
/// filename overwrites the earlier entry.
#[derive(Clone)]
pub struct ModelCache {
    tx: mpsc::Sender<Command>,
}

impl ModelCache {
    /// Load the cache document (if any) and spawn the owner task
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// valid cache document; malformed content is not silently discarded.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let entries: Entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("failed to read cache file {}: {e}", path.display()))?;
            serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("malformed cache file {}: {e}", path.display()))?
        } else {
            Entries::new()
        };

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(run(path, entries, rx));

        Ok(Self { tx })
    }

    /// Look up the entry for an uploaded filename
    pub async fn get(&self, key: &str) -> Option<ModelEntry> {
        let (reply, rx) = oneshot::channel();
        let command = Command::Get {
            key: key.to_string(),
            reply,
        };

        if self.tx.send(command).await.is_err() {
            return None;
        }

        rx.await.ok().flatten()
    }

    /// Upsert the entry for an uploaded filename and persist the map
    pub async fn insert(&self, key: String, entry: ModelEntry) -> crate::error::Result<()> {
        let (reply, rx) = oneshot::channel();
        let command = Command::Insert { key, entry, reply };

        self.tx
            .send(command)
            .await
            .map_err(|_| VoiceError::Internal(Some("model cache unavailable".to_string())))?;

        rx.await
            .map_err(|_| VoiceError::Internal(Some("model cache unavailable".to_string())))?
            .map_err(|e| VoiceError::Internal(Some(format!("failed to persist model cache: {e}"))))
    }

    /// Full contents of the cache
    pub async fn dump(&self) -> crate::error::Result<Entries> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(Command::Dump { reply })
            .await
            .map_err(|_| VoiceError::Internal(Some("model cache unavailable".to_string())))?;

        rx.await
            .map_err(|_| VoiceError::Internal(Some("model cache unavailable".to_string())))
    }
}

async fn run(path: PathBuf, mut entries: Entries, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Get { key, reply } => {
                let _ = reply.send(entries.get(&key).cloned());
            }
            Command::Insert { key, entry, reply } => {
                entries.insert(key, entry);
                let _ = reply.send(persist(&path, &entries));
            }
            Command::Dump { reply } => {
                let _ = reply.send(entries.clone());
            }
        }
    }
}

/// Write the full map, temp-file-then-rename so a crash cannot truncate it
fn persist(path: &Path, entries: &Entries) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
