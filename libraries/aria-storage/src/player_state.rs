//! Playback snapshot store
//!
//! Persists the queue engine's state (queue, cursor, mode, last position)
//! so playback can resume across process restarts.

use crate::error::Result;
use crate::snapshot::SnapshotFile;
use aria_core::types::PlayerSnapshot;
use std::path::PathBuf;
use tracing::debug;

/// Store for the persisted playback snapshot
///
/// Saves are best-effort and validated: inconsistent queue/original
/// orderings are backfilled and the cursor is clamped before anything
/// reaches disk, so every snapshot on disk is restorable as-is.
#[derive(Debug, Clone)]
pub struct PlayerStateStore {
    file: SnapshotFile,
}

impl PlayerStateStore {
    /// Create a store writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: SnapshotFile::new(path),
        }
    }

    /// Validate and persist a snapshot, overwriting any prior one
    pub async fn save(&self, snapshot: PlayerSnapshot) -> Result<()> {
        let mut snapshot = snapshot.normalized();
        snapshot.saved_at = chrono::Utc::now().timestamp();

        debug!(
            queue_len = snapshot.queue_track_ids.len(),
            current_index = ?snapshot.current_index,
            mode = %snapshot.mode,
            "saving playback snapshot"
        );
        self.file.write(&snapshot).await
    }

    /// Load the last saved snapshot
    ///
    /// Returns `None` when nothing was ever saved or the file is corrupt.
    /// The result is re-normalized so even a hand-edited file comes back
    /// with a valid cursor.
    pub async fn load(&self) -> Option<PlayerSnapshot> {
        let snapshot: PlayerSnapshot = self.file.read().await?;
        Some(snapshot.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_core::types::TrackId;

    fn ids(raw: &[&str]) -> Vec<TrackId> {
        raw.iter().map(|s| TrackId::new(*s)).collect()
    }

    #[tokio::test]
    async fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerStateStore::new(dir.path().join("player.json"));

        let snapshot = PlayerSnapshot {
            last_track_id: Some(TrackId::new("2")),
            last_position_ms: 42_000,
            queue_track_ids: ids(&["1", "2", "3"]),
            original_track_ids: ids(&["1", "2", "3"]),
            current_index: Some(1),
            ..Default::default()
        };

        store.save(snapshot.clone()).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.last_track_id, snapshot.last_track_id);
        assert_eq!(loaded.last_position_ms, 42_000);
        assert_eq!(loaded.queue_track_ids, snapshot.queue_track_ids);
        assert_eq!(loaded.current_index, Some(1));
    }

    #[tokio::test]
    async fn save_backfills_empty_queue_from_original() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerStateStore::new(dir.path().join("player.json"));

        let snapshot = PlayerSnapshot {
            original_track_ids: ids(&["1", "2", "3"]),
            ..Default::default()
        };
        store.save(snapshot).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.queue_track_ids, ids(&["1", "2", "3"]));
        assert_eq!(loaded.original_track_ids, ids(&["1", "2", "3"]));
    }

    #[tokio::test]
    async fn load_clamps_out_of_range_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");

        // Simulate a snapshot written by a buggy or older build
        std::fs::write(
            &path,
            r#"{
                "queue_track_ids": ["a", "b", "c"],
                "original_track_ids": ["a", "b", "c"],
                "current_index": 99
            }"#,
        )
        .unwrap();

        let store = PlayerStateStore::new(path);
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.current_index, Some(2));
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerStateStore::new(dir.path().join("player.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn load_corrupt_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, b"\x00\x01garbage").unwrap();

        let store = PlayerStateStore::new(path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn save_stamps_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerStateStore::new(dir.path().join("player.json"));

        store
            .save(PlayerSnapshot {
                queue_track_ids: ids(&["1"]),
                ..Default::default()
            })
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded.saved_at > 0);
    }
}
