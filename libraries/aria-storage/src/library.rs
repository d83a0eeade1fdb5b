//! Library cache snapshot store
//!
//! Persists the full media index (tracks and videos) so the app can
//! render the library on cold start without waiting for a catalog scan.

use crate::error::Result;
use crate::snapshot::SnapshotFile;
use aria_core::types::{Track, Video};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Persisted library index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// All known tracks, in catalog order
    #[serde(default)]
    pub tracks: Vec<Track>,

    /// All known videos, in catalog order
    #[serde(default)]
    pub videos: Vec<Video>,

    /// Unix timestamp of the save (seconds)
    #[serde(default)]
    pub saved_at: i64,
}

impl LibrarySnapshot {
    /// Age of this snapshot relative to `now` (Unix seconds)
    pub fn age_secs(&self, now: i64) -> i64 {
        now - self.saved_at
    }
}

/// Store for the persisted library index
#[derive(Debug, Clone)]
pub struct LibraryStore {
    file: SnapshotFile,
}

impl LibraryStore {
    /// Create a store writing to the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: SnapshotFile::new(path),
        }
    }

    /// Persist the library index, overwriting any prior snapshot
    pub async fn save(&self, tracks: Vec<Track>, videos: Vec<Video>) -> Result<()> {
        let snapshot = LibrarySnapshot {
            tracks,
            videos,
            saved_at: chrono::Utc::now().timestamp(),
        };

        debug!(
            tracks = snapshot.tracks.len(),
            videos = snapshot.videos.len(),
            "saving library snapshot"
        );
        self.file.write(&snapshot).await
    }

    /// Load the last saved library index
    ///
    /// Returns `None` when nothing was ever saved or the file is corrupt.
    pub async fn load(&self) -> Option<LibrarySnapshot> {
        self.file.read().await
    }
}
