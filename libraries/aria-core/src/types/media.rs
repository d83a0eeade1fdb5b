/// Mixed media listing type
use crate::types::{Track, Video};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry in a mixed library listing
///
/// The kind is part of the type; consumers match exhaustively instead of
/// inspecting runtime tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItem {
    /// An audio track
    Track(Track),

    /// A video
    Video(Video),
}

impl MediaItem {
    /// Display title of the item
    pub fn title(&self) -> &str {
        match self {
            Self::Track(track) => &track.title,
            Self::Video(video) => &video.title,
        }
    }

    /// Duration in milliseconds, if known
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            Self::Track(track) => track.duration_ms,
            Self::Video(video) => video.duration_ms,
        }
    }

    /// File path on disk
    pub fn locator(&self) -> &Path {
        match self {
            Self::Track(track) => &track.locator,
            Self::Video(video) => &video.locator,
        }
    }
}
