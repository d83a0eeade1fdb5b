//! Atomic JSON snapshot file
//!
//! The building block under both stores: one file, one keyed record.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// A single JSON snapshot on disk
///
/// Writes are atomic: the record is serialized to a sibling `.tmp` file
/// which is then renamed over the target, so readers only ever observe
/// the previous complete snapshot or the new one.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create a snapshot file handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this snapshot is stored at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and deserialize the snapshot
    ///
    /// Returns `None` when the file does not exist (never saved) or when
    /// it cannot be parsed (corrupt). Corruption is logged so the two
    /// cases stay distinguishable in the field, but callers see the same
    /// "start fresh" outcome for both.
    pub async fn read<T: DeserializeOwned>(&self) -> Option<T> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read snapshot");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot is corrupt, treating as absent"
                );
                None
            }
        }
    }

    /// Serialize and write the snapshot atomically
    pub async fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn read_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("missing.json"));

        let record: Option<Record> = file.read().await;
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("state.json"));

        let record = Record {
            name: "queue".to_string(),
            count: 3,
        };
        file.write(&record).await.unwrap();

        let loaded: Option<Record> = file.read().await;
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json at all").unwrap();

        let file = SnapshotFile::new(path);
        let record: Option<Record> = file.read().await;
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested/deeper/state.json"));

        file.write(&Record {
            name: "x".to_string(),
            count: 0,
        })
        .await
        .unwrap();

        assert!(file.path().exists());
    }

    #[tokio::test]
    async fn overwrite_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("state.json"));

        file.write(&Record {
            name: "first".to_string(),
            count: 1,
        })
        .await
        .unwrap();
        file.write(&Record {
            name: "second".to_string(),
            count: 2,
        })
        .await
        .unwrap();

        let loaded: Option<Record> = file.read().await;
        assert_eq!(loaded.unwrap().name, "second");
    }
}
