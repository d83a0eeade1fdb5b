/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Audio track
///
/// Owned by the track cache; everything else references tracks by id and
/// receives clones, never shared mutable access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Release year
    pub year: Option<u32>,

    /// Track duration in milliseconds
    pub duration_ms: Option<u64>,

    /// File path on disk
    pub locator: PathBuf,

    /// User-toggled favorite flag
    #[serde(default)]
    pub is_favorite: bool,

    /// Embedded album art, if any
    #[serde(default)]
    pub artwork: Option<Vec<u8>>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(title: impl Into<String>, locator: PathBuf) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist: None,
            album: None,
            genre: None,
            year: None,
            duration_ms: None,
            locator,
            is_favorite: false,
            artwork: None,
        }
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// Set the track duration from a Duration
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_ms = Some(duration.as_millis() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_creation() {
        let track = Track::new("Test Song", PathBuf::from("/music/song.mp3"));
        assert_eq!(track.title, "Test Song");
        assert_eq!(track.locator, PathBuf::from("/music/song.mp3"));
        assert!(track.artist.is_none());
        assert!(!track.is_favorite);
    }

    #[test]
    fn track_duration_conversion() {
        let mut track = Track::new("Song", PathBuf::from("/song.mp3"));
        track.set_duration(Duration::from_secs(180));

        assert_eq!(track.duration_ms, Some(180_000));
        assert_eq!(track.duration(), Some(Duration::from_secs(180)));
    }
}
