//! In-memory track cache
//!
//! Holds the id -> track index and the ordered media lists, backed by a
//! snapshot file for fast cold start and refreshed from the media catalog
//! when stale.

use crate::catalog::MediaCatalog;
use crate::error::Result;
use aria_core::types::{MediaItem, Track, TrackId, Video};
use aria_storage::LibraryStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for the track cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// How long a loaded index stays fresh before `is_stale` reports true
    /// (default: 5 minutes)
    pub refresh_interval: Duration,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(300),
        }
    }
}

/// One complete generation of the index
///
/// Built off to the side during a refresh, then swapped in whole; readers
/// never observe a half-populated index.
#[derive(Debug, Default)]
struct CacheInner {
    by_id: HashMap<TrackId, Track>,
    order: Vec<TrackId>,
    videos: Vec<Video>,
    loaded_at: Option<Instant>,
}

impl CacheInner {
    fn from_lists(tracks: Vec<Track>, videos: Vec<Video>, loaded_at: Option<Instant>) -> Self {
        let order: Vec<TrackId> = tracks.iter().map(|t| t.id.clone()).collect();
        let by_id = tracks.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            by_id,
            order,
            videos,
            loaded_at,
        }
    }

    fn tracks(&self) -> Vec<Track> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }
}

/// In-memory media index with snapshot-backed cold start
///
/// Owned by whoever assembles the app and injected into the playback
/// service; the service reads tracks by id during queue transitions and
/// schedules refreshes off the playback context.
pub struct TrackCache {
    catalog: Arc<dyn MediaCatalog>,
    store: LibraryStore,
    config: LibraryConfig,
    inner: RwLock<CacheInner>,
}

impl TrackCache {
    /// Create an empty cache over the given catalog and snapshot store
    pub fn new(catalog: Arc<dyn MediaCatalog>, store: LibraryStore, config: LibraryConfig) -> Self {
        Self {
            catalog,
            store,
            config,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    /// Load the library, preferring the local snapshot when fresh
    ///
    /// Order of preference:
    /// 1. the in-memory index, when already loaded and not stale;
    /// 2. the snapshot file, when present and younger than the refresh
    ///    interval;
    /// 3. a full catalog query (which also rewrites the snapshot).
    ///
    /// A catalog failure is logged and leaves whatever state was already
    /// installed (possibly a stale snapshot) untouched.
    pub async fn load(&self) -> Vec<Track> {
        if !self.is_stale(Instant::now()) {
            return self.tracks();
        }

        let never_loaded = self.read(|inner| inner.loaded_at.is_none() && inner.order.is_empty());
        if never_loaded {
            if let Some(snapshot) = self.store.load().await {
                let age_secs = snapshot.age_secs(chrono::Utc::now().timestamp()).max(0);
                let age = Duration::from_secs(age_secs as u64);
                let fresh = age <= self.config.refresh_interval;

                info!(
                    tracks = snapshot.tracks.len(),
                    age_secs, fresh, "installing library snapshot"
                );

                // Backdate loaded_at by the snapshot's age so staleness
                // keeps counting from the original save, not from now.
                let loaded_at = if fresh {
                    Instant::now().checked_sub(age).or(Some(Instant::now()))
                } else {
                    None
                };
                self.install(snapshot.tracks, snapshot.videos, loaded_at);

                if fresh {
                    return self.tracks();
                }
            }
        }

        // Stale or empty: go to the catalog. Failure keeps current state.
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "library load fell back to previous state");
        }
        self.tracks()
    }

    /// Re-query the catalog and atomically swap in the fresh index
    ///
    /// Favorite flags are carried over from the previous index, since the
    /// catalog has no notion of them. The snapshot file is rewritten on
    /// success.
    pub async fn refresh(&self) -> Result<()> {
        let tracks = self
            .catalog
            .list_tracks()
            .await
            .map_err(|e| {
                warn!(error = %e, "catalog query failed, keeping cached tracks");
                e
            })?;
        let videos = self.catalog.list_videos().await.unwrap_or_else(|e| {
            warn!(error = %e, "catalog video query failed, keeping none");
            Vec::new()
        });

        let tracks: Vec<Track> = {
            let inner = self.inner.read().expect("cache lock poisoned");
            tracks
                .into_iter()
                .map(|mut t| {
                    if let Some(prev) = inner.by_id.get(&t.id) {
                        t.is_favorite = prev.is_favorite;
                    }
                    t
                })
                .collect()
        };

        debug!(tracks = tracks.len(), videos = videos.len(), "library refreshed");
        self.install(tracks.clone(), videos.clone(), Some(Instant::now()));

        if let Err(e) = self.store.save(tracks, videos).await {
            warn!(error = %e, "failed to write library snapshot");
        }
        Ok(())
    }

    /// O(1) track lookup by id
    pub fn get(&self, id: &TrackId) -> Option<Track> {
        self.read(|inner| inner.by_id.get(id).cloned())
    }

    /// All tracks in catalog order
    pub fn tracks(&self) -> Vec<Track> {
        self.read(CacheInner::tracks)
    }

    /// All videos in catalog order
    pub fn videos(&self) -> Vec<Video> {
        self.read(|inner| inner.videos.clone())
    }

    /// Mixed listing for library views: tracks first, then videos
    pub fn media_items(&self) -> Vec<MediaItem> {
        self.read(|inner| {
            inner
                .tracks()
                .into_iter()
                .map(MediaItem::Track)
                .chain(inner.videos.iter().cloned().map(MediaItem::Video))
                .collect()
        })
    }

    /// Number of cached tracks
    pub fn len(&self) -> usize {
        self.read(|inner| inner.order.len())
    }

    /// True when no tracks are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the index was never loaded or has outlived the refresh
    /// interval
    pub fn is_stale(&self, now: Instant) -> bool {
        self.read(|inner| match inner.loaded_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.config.refresh_interval,
        })
    }

    /// Flip a track's favorite flag and persist the change
    ///
    /// Returns the new flag value, or `None` for an unknown id.
    pub async fn set_favorite(&self, id: &TrackId, favorite: bool) -> Option<bool> {
        {
            let mut inner = self.inner.write().expect("cache lock poisoned");
            let track = inner.by_id.get_mut(id)?;
            track.is_favorite = favorite;
        }

        let (tracks, videos) = self.read(|inner| (inner.tracks(), inner.videos.clone()));
        if let Err(e) = self.store.save(tracks, videos).await {
            warn!(error = %e, "failed to persist favorite change");
        }
        Some(favorite)
    }

    /// Toggle a track's favorite flag and persist the change
    pub async fn toggle_favorite(&self, id: &TrackId) -> Option<bool> {
        let next = self.read(|inner| inner.by_id.get(id).map(|t| !t.is_favorite))?;
        self.set_favorite(id, next).await
    }

    fn install(&self, tracks: Vec<Track>, videos: Vec<Video>, loaded_at: Option<Instant>) {
        let next = CacheInner::from_lists(tracks, videos, loaded_at);
        let mut inner = self.inner.write().expect("cache lock poisoned");
        *inner = next;
    }

    fn read<R>(&self, f: impl FnOnce(&CacheInner) -> R) -> R {
        let inner = self.inner.read().expect("cache lock poisoned");
        f(&inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeCatalog {
        tracks: Vec<Track>,
        fail: AtomicBool,
        queries: AtomicUsize,
    }

    impl FakeCatalog {
        fn with_tracks(tracks: Vec<Track>) -> Self {
            Self {
                tracks,
                fail: AtomicBool::new(false),
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MediaCatalog for FakeCatalog {
        async fn list_tracks(&self) -> Result<Vec<Track>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(LibraryError::catalog("scan failed"));
            }
            Ok(self.tracks.clone())
        }

        async fn list_videos(&self) -> Result<Vec<Video>> {
            Ok(Vec::new())
        }
    }

    fn track(id: &str, title: &str) -> Track {
        let mut t = Track::new(title, PathBuf::from(format!("/music/{id}.mp3")));
        t.id = TrackId::new(id);
        t
    }

    fn cache_with(
        catalog: Arc<FakeCatalog>,
        dir: &tempfile::TempDir,
    ) -> TrackCache {
        TrackCache::new(
            catalog,
            LibraryStore::new(dir.path().join("library.json")),
            LibraryConfig::default(),
        )
    }

    #[tokio::test]
    async fn load_queries_catalog_and_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(vec![track("1", "One")]));
        let cache = cache_with(Arc::clone(&catalog), &dir);

        let tracks = cache.load().await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("library.json").exists());
    }

    #[tokio::test]
    async fn second_load_within_interval_skips_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(vec![track("1", "One")]));
        let cache = cache_with(Arc::clone(&catalog), &dir);

        cache.load().await;
        cache.load().await;
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_snapshot_serves_cold_start_without_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(vec![track("1", "One")]));

        // First cache instance populates the snapshot.
        let first = cache_with(Arc::clone(&catalog), &dir);
        first.load().await;

        // Second instance (new process) should start from the snapshot.
        let second = cache_with(Arc::clone(&catalog), &dir);
        let tracks = second.load().await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn catalog_failure_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(vec![track("1", "One")]));
        let cache = cache_with(Arc::clone(&catalog), &dir);

        cache.load().await;
        catalog.fail.store(true, Ordering::SeqCst);

        assert!(cache.refresh().await.is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&TrackId::new("1")).unwrap().title, "One");
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(Vec::new()));
        let cache = cache_with(catalog, &dir);

        assert!(cache.get(&TrackId::new("nope")).is_none());
    }

    #[tokio::test]
    async fn stale_before_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(Vec::new()));
        let cache = cache_with(catalog, &dir);

        assert!(cache.is_stale(Instant::now()));
    }

    #[tokio::test]
    async fn refresh_preserves_favorites() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(vec![track("1", "One")]));
        let cache = cache_with(Arc::clone(&catalog), &dir);

        cache.load().await;
        let id = TrackId::new("1");
        assert_eq!(cache.toggle_favorite(&id).await, Some(true));

        cache.refresh().await.unwrap();
        assert!(cache.get(&id).unwrap().is_favorite);
    }

    #[tokio::test]
    async fn toggle_favorite_unknown_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::with_tracks(Vec::new()));
        let cache = cache_with(catalog, &dir);

        assert_eq!(cache.toggle_favorite(&TrackId::new("ghost")).await, None);
    }
}
