//! Core types for playback management

use aria_core::types::{Track, TrackId, TrackSummary};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Track information for queue management
///
/// Denormalized from the cached `Track` so queue transitions never touch
/// the catalog or do I/O. The heavyweight fields (artwork) stay behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueTrack {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Track duration in milliseconds
    pub duration_ms: Option<u64>,

    /// File path for the media backend
    pub locator: PathBuf,
}

impl QueueTrack {
    /// Rebuild a queue entry from a snapshot's display fields
    ///
    /// Used on restore when the catalog no longer knows the id.
    pub fn from_summary(id: TrackId, summary: &TrackSummary) -> Self {
        Self {
            id,
            title: summary.title.clone(),
            artist: summary.artist.clone(),
            album: summary.album.clone(),
            duration_ms: summary.duration_ms,
            locator: summary.locator.clone(),
        }
    }

    /// Display fields for the persisted snapshot
    pub fn to_summary(&self) -> TrackSummary {
        TrackSummary {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            duration_ms: self.duration_ms,
            locator: self.locator.clone(),
        }
    }
}

impl From<&Track> for QueueTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            duration_ms: track.duration_ms,
            locator: track.locator.clone(),
        }
    }
}

impl From<Track> for QueueTrack {
    fn from(track: Track) -> Self {
        Self::from(&track)
    }
}

/// Externally visible playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track loaded
    Stopped,

    /// Loading/buffering a track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Configuration for the player service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How often the playback snapshot is written while running
    /// (default: 5 seconds)
    pub persist_interval: Duration,

    /// How often the session is polled for position/completion
    /// (default: 250 ms)
    pub poll_interval: Duration,

    /// How often the library is checked for staleness and refreshed
    /// (default: 5 minutes)
    pub library_refresh_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            persist_interval: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            library_refresh_interval: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.persist_interval, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.library_refresh_interval, Duration::from_secs(300));
    }

    #[test]
    fn queue_track_from_track_drops_artwork() {
        let mut track = Track::new("Song", PathBuf::from("/music/song.mp3"));
        track.artwork = Some(vec![0xFF; 1024]);

        let entry = QueueTrack::from(&track);
        assert_eq!(entry.id, track.id);
        assert_eq!(entry.title, "Song");
    }

    #[test]
    fn summary_round_trip_keeps_display_fields() {
        let track = QueueTrack {
            id: TrackId::new("t1"),
            title: "Title".to_string(),
            artist: Some("Artist".to_string()),
            album: Some("Album".to_string()),
            duration_ms: Some(180_000),
            locator: PathBuf::from("/music/t1.mp3"),
        };

        let rebuilt = QueueTrack::from_summary(track.id.clone(), &track.to_summary());
        assert_eq!(rebuilt, track);
    }
}
