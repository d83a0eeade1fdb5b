//! Queue engine
//!
//! The canonical (PlayQueue, CurrentIndex, PlayMode) state machine. Pure
//! and synchronous; the player service serializes every transition on the
//! playback context and drives the media session from the results.
//!
//! Two orderings are kept at all times: `queue` is the active play order
//! and `original` is the unshuffled order retained for exact un-shuffle.
//! Whenever both are non-empty they hold the same multiset of track ids,
//! and the cursor is a valid index into `queue` (None only when empty).

use crate::shuffle::{random_index, shuffled_with_current_first};
use crate::types::QueueTrack;
use aria_core::types::{PlayMode, PlayerSnapshot, TrackId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Outcome of a cursor/session consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The cursor already points at the loaded track
    InSync,

    /// The cursor was moved to the loaded track's position
    Corrected {
        /// The corrected cursor value
        index: usize,
    },

    /// The loaded track is not in the queue; the cursor was left alone
    /// and the caller must rebuild state from scratch
    Unresolved,
}

/// Playback queue state machine
#[derive(Debug, Clone, Default)]
pub struct QueueEngine {
    /// Active play order
    queue: Vec<QueueTrack>,

    /// Unshuffled order, for restoring when shuffle is turned off
    original: Vec<QueueTrack>,

    /// Cursor into `queue`; None only while the queue is empty
    current: Option<usize>,

    /// Active playback mode
    mode: PlayMode,
}

impl QueueEngine {
    /// Create an empty engine in the default mode
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Transitions =====

    /// Replace the queue with `tracks` and position the cursor
    ///
    /// The start index is clamped into range. Returns the track to begin
    /// playing, or None when `tracks` is empty (the engine is left
    /// unchanged in that case).
    pub fn start_playback(
        &mut self,
        tracks: Vec<QueueTrack>,
        start_index: usize,
    ) -> Option<QueueTrack> {
        if tracks.is_empty() {
            return None;
        }

        let index = start_index.min(tracks.len() - 1);
        self.original = tracks.clone();
        self.queue = tracks;
        self.current = Some(index);

        if self.mode == PlayMode::ShuffleAll {
            // Keep the selected track playing while re-randomizing the rest
            self.reshuffle_pinning_current();
        }

        self.current_track().cloned()
    }

    /// Move the cursor to an explicit queue position
    ///
    /// Out-of-range indices are clamped, never surfaced as errors.
    pub fn play_from_queue(&mut self, index: usize) -> Option<QueueTrack> {
        if self.queue.is_empty() {
            return None;
        }

        self.current = Some(index.min(self.queue.len() - 1));
        self.current_track().cloned()
    }

    /// Advance the cursor according to the active mode
    ///
    /// RepeatOne replays the same index; ShuffleAll draws a uniform random
    /// index with replacement, so the same track may repeat; RepeatAll
    /// steps forward and wraps. No-op on an empty queue.
    pub fn next(&mut self) -> Option<QueueTrack> {
        if self.queue.is_empty() {
            return None;
        }

        let len = self.queue.len();
        let index = self.current.unwrap_or(0);
        self.current = Some(match self.mode {
            PlayMode::RepeatOne => index,
            PlayMode::ShuffleAll => random_index(len),
            PlayMode::RepeatAll => (index + 1) % len,
        });

        self.current_track().cloned()
    }

    /// Step the cursor backwards according to the active mode
    ///
    /// Mirror of `next`: RepeatOne replays, ShuffleAll draws randomly,
    /// RepeatAll steps back and wraps. No-op on an empty queue.
    pub fn previous(&mut self) -> Option<QueueTrack> {
        if self.queue.is_empty() {
            return None;
        }

        let len = self.queue.len();
        let index = self.current.unwrap_or(0);
        self.current = Some(match self.mode {
            PlayMode::RepeatOne => index,
            PlayMode::ShuffleAll => random_index(len),
            PlayMode::RepeatAll => (index + len - 1) % len,
        });

        self.current_track().cloned()
    }

    /// Cycle the playback mode
    ///
    /// Entering ShuffleAll rebuilds the queue as a permutation of the
    /// original order with the current track pinned at index 0. Leaving
    /// it restores the original order with the cursor back on the same
    /// track. Returns the new mode.
    pub fn toggle_mode(&mut self) -> PlayMode {
        let leaving_shuffle = self.mode == PlayMode::ShuffleAll;
        self.mode = self.mode.cycled();

        if self.queue.is_empty() {
            return self.mode;
        }

        if self.mode == PlayMode::ShuffleAll {
            self.reshuffle_pinning_current();
        } else if leaving_shuffle {
            let current_id = self.current_track().map(|t| t.id.clone());
            self.queue = self.original.clone();
            self.current = Some(
                current_id
                    .and_then(|id| self.queue.iter().position(|t| t.id == id))
                    .unwrap_or(0),
            );
        }

        debug!(mode = %self.mode, current = ?self.current, "mode toggled");
        self.mode
    }

    /// Check that the cursor agrees with the track the session loaded
    ///
    /// Idempotent. When the loaded track differs from the track under the
    /// cursor, the queue is searched for it and the cursor corrected; if
    /// it is not in the queue at all the mismatch is logged and left for
    /// the caller to resolve by rebuilding.
    pub fn verify_sync(&mut self, loaded: Option<&TrackId>) -> SyncStatus {
        let Some(loaded) = loaded else {
            return SyncStatus::InSync;
        };

        if self.current_track().map(|t| &t.id) == Some(loaded) {
            return SyncStatus::InSync;
        }

        match self.queue.iter().position(|t| &t.id == loaded) {
            Some(index) => {
                warn!(index, track_id = %loaded, "cursor out of sync, correcting");
                self.current = Some(index);
                SyncStatus::Corrected { index }
            }
            None => {
                warn!(track_id = %loaded, "loaded track missing from queue");
                SyncStatus::Unresolved
            }
        }
    }

    // ===== State Queries =====

    /// The track under the cursor
    pub fn current_track(&self) -> Option<&QueueTrack> {
        self.current.and_then(|i| self.queue.get(i))
    }

    /// The cursor position
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The active playback mode
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// The active play order
    pub fn tracks(&self) -> &[QueueTrack] {
        &self.queue
    }

    /// The unshuffled order
    pub fn original_order(&self) -> &[QueueTrack] {
        &self.original
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no tracks are queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    // ===== Persistence =====

    /// Capture the engine state as a persistable snapshot
    pub fn snapshot(&self, last_position_ms: u64) -> PlayerSnapshot {
        let mut tracks: HashMap<String, _> = HashMap::with_capacity(self.queue.len());
        for track in self.queue.iter().chain(self.original.iter()) {
            tracks
                .entry(track.id.to_string())
                .or_insert_with(|| track.to_summary());
        }

        PlayerSnapshot {
            last_track_id: self.current_track().map(|t| t.id.clone()),
            last_position_ms,
            mode: self.mode,
            queue_track_ids: self.queue.iter().map(|t| t.id.clone()).collect(),
            original_track_ids: self.original.iter().map(|t| t.id.clone()).collect(),
            current_index: self.current,
            tracks,
            saved_at: 0,
        }
    }

    /// Rebuild an engine from a persisted snapshot
    ///
    /// Ids are resolved through `resolve` (normally the track cache) with
    /// the snapshot's own display map as fallback, so a restored queue
    /// plays even before the catalog reloads. Ids that resolve nowhere
    /// are dropped; the cursor is re-anchored to the last playing track
    /// when possible and clamped otherwise.
    pub fn restore(
        snapshot: &PlayerSnapshot,
        mut resolve: impl FnMut(&TrackId) -> Option<QueueTrack>,
    ) -> Self {
        let snapshot = snapshot.clone().normalized();

        let mut lookup = |id: &TrackId| {
            resolve(id).or_else(|| {
                snapshot
                    .tracks
                    .get(id.as_str())
                    .map(|summary| QueueTrack::from_summary(id.clone(), summary))
            })
        };

        let queue: Vec<QueueTrack> = snapshot.queue_track_ids.iter().filter_map(&mut lookup).collect();
        let original: Vec<QueueTrack> = snapshot
            .original_track_ids
            .iter()
            .filter_map(&mut lookup)
            .collect();

        let dropped = snapshot.queue_track_ids.len() - queue.len();
        if dropped > 0 {
            warn!(dropped, "snapshot referenced unknown tracks, dropped");
        }

        let current = if queue.is_empty() {
            None
        } else {
            let last = queue.len() - 1;
            snapshot
                .last_track_id
                .as_ref()
                .and_then(|id| queue.iter().position(|t| &t.id == id))
                .or_else(|| snapshot.current_index.map(|i| i.min(last)))
                .or(Some(0))
        };

        Self {
            queue,
            original,
            current,
            mode: snapshot.mode,
        }
    }

    fn reshuffle_pinning_current(&mut self) {
        let current_id = self.current_track().map(|t| t.id.clone());
        self.queue = shuffled_with_current_first(&self.original, current_id.as_ref());
        self.current = Some(0);
    }
}
