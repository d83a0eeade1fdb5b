//! Playback session
//!
//! Wraps the single-track media resource behind the `MediaBackend` seam
//! and tracks its lifecycle: `Idle -> Loading -> Ready -> Playing <->
//! Paused -> Completed`, with `stop` releasing the resource back to
//! `Idle`.
//!
//! Loading is asynchronous. Every load bumps a generation counter and the
//! result comes back through the session event channel tagged with the
//! generation it belongs to; results for superseded generations are
//! discarded so a cancelled load can never clobber the current track.

use crate::types::{PlaybackStatus, QueueTrack};
use aria_core::types::TrackId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Platform seam: prepares a playable stream for a track
///
/// Implementations wrap whatever actually renders audio (a platform
/// player on mobile, a decoder pipeline on desktop, a fake in tests).
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Prepare a stream for the track's locator
    ///
    /// May take arbitrarily long (disk or network I/O); the session calls
    /// it off the playback context.
    async fn load(&self, track: &QueueTrack) -> std::result::Result<Box<dyn MediaStream>, String>;
}

/// A prepared single-track media resource
pub trait MediaStream: Send {
    /// Start or resume rendering
    fn play(&mut self);

    /// Pause rendering
    fn pause(&mut self);

    /// Jump to a position within the track
    fn seek(&mut self, position: Duration);

    /// Current position within the track
    fn position(&self) -> Duration;

    /// Total track duration
    fn duration(&self) -> Duration;

    /// True once rendering has reached end-of-track
    fn is_finished(&self) -> bool;
}

/// Result of an asynchronous load, delivered on the session event channel
pub enum SessionEvent {
    /// A load finished (successfully or not)
    Loaded {
        /// Generation the load belongs to
        generation: u64,
        /// Track the load was for
        track_id: TrackId,
        /// The prepared stream, or the backend's failure reason
        result: std::result::Result<Box<dyn MediaStream>, String>,
    },
}

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No resource held
    Idle,

    /// A load is in flight
    Loading,

    /// Prepared, not yet playing
    Ready,

    /// Rendering
    Playing,

    /// Paused mid-track
    Paused,

    /// Reached end-of-track; resource still held for replay
    Completed,
}

/// What applying a load result meant for the session
#[derive(Debug)]
pub enum LoadOutcome {
    /// The result belonged to a superseded load and was discarded
    Stale,

    /// The track is prepared and ready to play
    Ready {
        /// The prepared track
        track_id: TrackId,
    },

    /// The backend could not prepare the track
    Failed {
        /// The track that failed
        track_id: TrackId,
        /// Backend-reported cause
        reason: String,
    },
}

/// Single-track playback session
pub struct PlaybackSession {
    backend: Arc<dyn MediaBackend>,
    events_tx: mpsc::Sender<SessionEvent>,
    stream: Option<Box<dyn MediaStream>>,
    state: SessionState,
    generation: u64,
    track: Option<QueueTrack>,
    completion_emitted: bool,
}

impl PlaybackSession {
    /// Create an idle session over the given backend
    ///
    /// Load results arrive on `events_tx`; the owner must feed them back
    /// through [`PlaybackSession::apply_load`].
    pub fn new(backend: Arc<dyn MediaBackend>, events_tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            backend,
            events_tx,
            stream: None,
            state: SessionState::Idle,
            generation: 0,
            track: None,
            completion_emitted: false,
        }
    }

    /// Start loading a track, cancelling any load still in flight
    ///
    /// The current resource is released first; the session is `Loading`
    /// until the matching [`SessionEvent`] is applied.
    pub fn begin_load(&mut self, track: QueueTrack) {
        self.generation += 1;
        self.stream = None;
        self.state = SessionState::Loading;
        self.completion_emitted = false;
        self.track = Some(track.clone());

        debug!(track_id = %track.id, generation = self.generation, "loading track");

        let generation = self.generation;
        let backend = Arc::clone(&self.backend);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.load(&track).await;
            // The receiver disappearing just means the service shut down
            let _ = events_tx
                .send(SessionEvent::Loaded {
                    generation,
                    track_id: track.id,
                    result,
                })
                .await;
        });
    }

    /// Apply a load result from the event channel
    ///
    /// Results tagged with a superseded generation are discarded without
    /// touching session state.
    pub fn apply_load(&mut self, event: SessionEvent) -> LoadOutcome {
        let SessionEvent::Loaded {
            generation,
            track_id,
            result,
        } = event;

        if generation != self.generation {
            debug!(track_id = %track_id, generation, "discarding stale load result");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Ready;
                LoadOutcome::Ready { track_id }
            }
            Err(reason) => {
                warn!(track_id = %track_id, reason = %reason, "track load failed");
                self.stream = None;
                self.track = None;
                self.state = SessionState::Idle;
                LoadOutcome::Failed { track_id, reason }
            }
        }
    }

    /// Start or resume playback
    ///
    /// No-op unless a prepared stream is held.
    pub fn play(&mut self) -> bool {
        match self.state {
            SessionState::Ready | SessionState::Paused => {
                if let Some(stream) = self.stream.as_mut() {
                    stream.play();
                    self.state = SessionState::Playing;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Pause playback; no-op unless playing
    pub fn pause(&mut self) -> bool {
        if self.state == SessionState::Playing {
            if let Some(stream) = self.stream.as_mut() {
                stream.pause();
                self.state = SessionState::Paused;
                return true;
            }
        }
        false
    }

    /// Seek within the current track; no-op when not ready
    pub fn seek_ms(&mut self, position_ms: u64) {
        if !self.is_ready() {
            return;
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.seek(Duration::from_millis(position_ms));
            self.completion_emitted = false;
        }
    }

    /// Replay the current track from the start
    ///
    /// Used for repeat-one: rewinds and resumes the already-loaded
    /// resource without dispatching a new load.
    pub fn replay(&mut self) -> bool {
        if let Some(stream) = self.stream.as_mut() {
            stream.seek(Duration::ZERO);
            stream.play();
            self.completion_emitted = false;
            self.state = SessionState::Playing;
            return true;
        }
        false
    }

    /// Release the current resource and return to idle
    pub fn stop(&mut self) {
        self.stream = None;
        self.track = None;
        self.state = SessionState::Idle;
        self.completion_emitted = false;
    }

    /// Check whether the playing track has reached its end
    ///
    /// Emits at most one completion per loaded track, and only from the
    /// `Playing` state, so pausing or seeking can never produce one.
    pub fn poll_completion(&mut self) -> Option<TrackId> {
        if self.state != SessionState::Playing || self.completion_emitted {
            return None;
        }

        let finished = self.stream.as_ref().is_some_and(|s| s.is_finished());
        if !finished {
            return None;
        }

        self.completion_emitted = true;
        self.state = SessionState::Completed;
        self.track.as_ref().map(|t| t.id.clone())
    }

    /// Current position in milliseconds; 0 when not ready
    pub fn position_ms(&self) -> u64 {
        if !self.is_ready() {
            return 0;
        }
        self.stream
            .as_ref()
            .map(|s| s.position().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Track duration in milliseconds; 0 when not ready
    pub fn duration_ms(&self) -> u64 {
        if !self.is_ready() {
            return 0;
        }
        self.stream
            .as_ref()
            .map(|s| s.duration().as_millis() as u64)
            .unwrap_or(0)
    }

    /// True once a stream is prepared (ready, playing, paused, completed)
    pub fn is_ready(&self) -> bool {
        matches!(
            self.state,
            SessionState::Ready
                | SessionState::Playing
                | SessionState::Paused
                | SessionState::Completed
        )
    }

    /// Lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The track this session is loaded with (or loading)
    pub fn track(&self) -> Option<&QueueTrack> {
        self.track.as_ref()
    }

    /// Externally visible status
    pub fn status(&self) -> PlaybackStatus {
        match self.state {
            SessionState::Idle | SessionState::Completed => PlaybackStatus::Stopped,
            SessionState::Loading => PlaybackStatus::Loading,
            SessionState::Playing => PlaybackStatus::Playing,
            SessionState::Ready | SessionState::Paused => PlaybackStatus::Paused,
        }
    }
}
