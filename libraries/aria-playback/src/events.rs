//! Playback events
//!
//! Typed change notifications broadcast to UI and session collaborators.
//! Delivery is fire-and-forget: the bus never blocks on slow consumers,
//! lagging receivers drop messages, and payloads are advisory; consumers
//! re-query the player handle for authoritative state.

use crate::types::PlaybackStatus;
use aria_core::types::{PlayMode, TrackId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Why the current track changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackChangeReason {
    /// A new queue was started or a queue entry was selected
    Started,

    /// The previous track finished and playback advanced
    Completed,

    /// A next/previous transport control moved the cursor
    Skipped,

    /// The track was reinstated from a persisted snapshot
    Restored,

    /// The previous track failed to load and playback advanced
    LoadFailed,
}

/// Events emitted by the player service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Queue contents or order changed
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// The current track changed
    TrackChanged {
        /// ID of the new current track
        track_id: TrackId,
        /// What caused the change
        reason: TrackChangeReason,
    },

    /// Play/pause/load status changed
    PlaybackStateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// The playback mode changed
    ModeChanged {
        /// The new mode
        mode: PlayMode,
    },
}

/// Broadcast bus for player events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: PlayerEvent) {
        trace!(?event, "publishing player event");
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
