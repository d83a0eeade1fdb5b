//! Aria Player Core
//!
//! Platform-agnostic domain types and error handling for Aria Player.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace:
//! - **Domain Types**: `Track`, `Video`, id newtypes
//! - **Playback State**: `PlayMode` and the persisted `PlayerSnapshot`
//! - **Error Handling**: the shared `AriaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use aria_core::types::{Track, TrackId};
//! use std::path::PathBuf;
//!
//! let track = Track::new("My Favorite Song", PathBuf::from("/music/song.mp3"));
//! assert!(!track.is_favorite);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{AriaError, Result};

pub use types::{
    MediaItem, PlayMode, PlayerSnapshot, Track, TrackId, TrackSummary, Video, VideoId,
};
