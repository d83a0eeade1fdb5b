//! Aria Player - Playback Management
//!
//! The playback queue and state engine: what is playing, in what order,
//! under which repeat/shuffle mode.
//!
//! This crate provides:
//! - Queue engine with dual orderings (active play order + unshuffled
//!   original) and a single cursor
//! - Playback modes (RepeatAll, RepeatOne, ShuffleAll)
//! - Playback session over a pluggable `MediaBackend`
//! - Typed change events over a broadcast bus
//! - A serialized player service that owns all state transitions and
//!   drives snapshot persistence
//!
//! # Architecture
//!
//! `aria-playback` is platform-agnostic: audio rendering and the device
//! media index are provided via the `MediaBackend` and catalog traits.
//! The `PlayerService` task is the only place engine state mutates;
//! everything else talks to it through a `PlayerHandle`.
//!
//! # Example
//!
//! ```rust,no_run
//! use aria_playback::{PlayerService, PlayerConfig, QueueTrack, MediaBackend};
//! use aria_library::{TrackCache, LibraryConfig, MediaCatalog};
//! use aria_storage::{LibraryStore, PlayerStateStore};
//! use std::sync::Arc;
//!
//! # async fn run(catalog: Arc<dyn MediaCatalog>, backend: Arc<dyn MediaBackend>) {
//! let cache = Arc::new(TrackCache::new(
//!     catalog,
//!     LibraryStore::new("/data/aria/library.json"),
//!     LibraryConfig::default(),
//! ));
//! let store = PlayerStateStore::new("/data/aria/player.json");
//!
//! let player = PlayerService::spawn(cache, backend, store, PlayerConfig::default());
//!
//! let tracks: Vec<QueueTrack> = Vec::new();
//! player.start_playback(tracks, 0).await.ok();
//! player.toggle_mode().await.ok();
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod events;
mod queue;
mod service;
mod session;
mod shuffle;
pub mod types;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::{EventBus, PlayerEvent, TrackChangeReason};
pub use queue::{QueueEngine, SyncStatus};
pub use service::{PlayerHandle, PlayerService, PlayerStatusView};
pub use session::{
    LoadOutcome, MediaBackend, MediaStream, PlaybackSession, SessionEvent, SessionState,
};
pub use types::{PlaybackStatus, PlayerConfig, QueueTrack};
