//! Snapshot adapters: where the cache keeps its state between restarts

use crate::error::Result;
use crate::types::CacheRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Serialized form of the whole store: resource key to record
pub type Snapshot = HashMap<String, CacheRecord>;

/// Storage strategy for full-store snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Read the last snapshot. `Ok(None)` means there is nothing to restore.
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot with `snapshot`
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps nothing outside the process
#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySnapshot;

#[async_trait]
impl SnapshotStore for MemorySnapshot {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}

/// Writes the store as one JSON document at a fixed path
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshot {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Rename over the old file so readers never see a partial snapshot
        let tmp = self.temp_path();
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = ?tmp, error = %cleanup, "Failed to remove temporary snapshot");
            }
            return Err(e.into());
        }

        debug!(path = ?self.path, entries = snapshot.len(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

/// Deployment choice for cache persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    Memory,
    File(PathBuf),
}

impl PersistenceMode {
    /// Build the snapshot adapter for this mode
    pub fn into_store(self) -> Arc<dyn SnapshotStore> {
        match self {
            PersistenceMode::Memory => Arc::new(MemorySnapshot),
            PersistenceMode::File(path) => Arc::new(FileSnapshot::new(path)),
        }
    }
}
