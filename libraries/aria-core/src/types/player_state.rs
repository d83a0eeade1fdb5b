/// Persisted playback state types
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Playback mode
///
/// Exactly one mode is active at a time. The transport "toggle mode"
/// control cycles RepeatAll -> RepeatOne -> ShuffleAll -> RepeatAll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    /// Play the queue in order, wrapping at the end
    #[default]
    RepeatAll,

    /// Replay the current track indefinitely
    RepeatOne,

    /// Random navigation over a shuffled queue
    ShuffleAll,
}

impl PlayMode {
    /// The mode the toggle control advances to from this one
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::RepeatAll => Self::RepeatOne,
            Self::RepeatOne => Self::ShuffleAll,
            Self::ShuffleAll => Self::RepeatAll,
        }
    }

    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepeatAll => "repeat-all",
            Self::RepeatOne => "repeat-one",
            Self::ShuffleAll => "shuffle-all",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "repeat-all" => Some(Self::RepeatAll),
            "repeat-one" => Some(Self::RepeatOne),
            "shuffle-all" => Some(Self::ShuffleAll),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display fields denormalized into the snapshot
///
/// Lets the UI render a restored queue (and playback resume the last
/// track) before the full catalog has been reloaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Track title
    #[serde(default)]
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// File path on disk
    #[serde(default)]
    pub locator: PathBuf,
}

/// Persisted playback snapshot
///
/// Serialized as a versionless keyed record; unknown fields are ignored
/// and missing fields default, so older or partial snapshots still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Track that was loaded when the snapshot was taken
    #[serde(default)]
    pub last_track_id: Option<TrackId>,

    /// Playback position within that track, in milliseconds
    #[serde(default)]
    pub last_position_ms: u64,

    /// Active playback mode
    #[serde(default)]
    pub mode: PlayMode,

    /// Active play order (ids)
    #[serde(default)]
    pub queue_track_ids: Vec<TrackId>,

    /// Unshuffled order (ids)
    #[serde(default)]
    pub original_track_ids: Vec<TrackId>,

    /// Cursor into `queue_track_ids`
    #[serde(default)]
    pub current_index: Option<usize>,

    /// id -> display fields for every queued track
    #[serde(default)]
    pub tracks: HashMap<String, TrackSummary>,

    /// Unix timestamp of the save (seconds)
    #[serde(default)]
    pub saved_at: i64,
}

impl PlayerSnapshot {
    /// Repair the snapshot into a consistent state before it is written
    /// or restored.
    ///
    /// Rules:
    /// - if exactly one of the two orderings is empty, the non-empty one
    ///   backfills the empty one;
    /// - `current_index` is clamped into `[0, len - 1]` and forced to
    ///   `None` when the queue is empty.
    ///
    /// Idempotent: normalizing a normalized snapshot changes nothing.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.queue_track_ids.is_empty() && !self.original_track_ids.is_empty() {
            self.queue_track_ids = self.original_track_ids.clone();
        } else if self.original_track_ids.is_empty() && !self.queue_track_ids.is_empty() {
            self.original_track_ids = self.queue_track_ids.clone();
        }

        self.current_index = if self.queue_track_ids.is_empty() {
            None
        } else {
            let last = self.queue_track_ids.len() - 1;
            Some(self.current_index.unwrap_or(0).min(last))
        };

        self
    }

    /// True when the snapshot describes no queue at all
    pub fn is_empty(&self) -> bool {
        self.queue_track_ids.is_empty() && self.original_track_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<TrackId> {
        raw.iter().map(|s| TrackId::new(*s)).collect()
    }

    #[test]
    fn mode_cycle_returns_after_three_steps() {
        let start = PlayMode::RepeatAll;
        assert_eq!(start.cycled().cycled().cycled(), start);
    }

    #[test]
    fn mode_string_round_trip() {
        for mode in [PlayMode::RepeatAll, PlayMode::RepeatOne, PlayMode::ShuffleAll] {
            assert_eq!(PlayMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(PlayMode::from_str("bogus"), None);
    }

    #[test]
    fn normalize_backfills_empty_queue_from_original() {
        let snapshot = PlayerSnapshot {
            original_track_ids: ids(&["1", "2", "3"]),
            ..Default::default()
        }
        .normalized();

        assert_eq!(snapshot.queue_track_ids, ids(&["1", "2", "3"]));
        assert_eq!(snapshot.original_track_ids, ids(&["1", "2", "3"]));
    }

    #[test]
    fn normalize_backfills_empty_original_from_queue() {
        let snapshot = PlayerSnapshot {
            queue_track_ids: ids(&["a", "b"]),
            ..Default::default()
        }
        .normalized();

        assert_eq!(snapshot.original_track_ids, ids(&["a", "b"]));
    }

    #[test]
    fn normalize_clamps_out_of_range_index() {
        let snapshot = PlayerSnapshot {
            queue_track_ids: ids(&["1", "2", "3"]),
            original_track_ids: ids(&["1", "2", "3"]),
            current_index: Some(99),
            ..Default::default()
        }
        .normalized();

        assert_eq!(snapshot.current_index, Some(2));
    }

    #[test]
    fn normalize_defaults_missing_index_to_zero() {
        let snapshot = PlayerSnapshot {
            queue_track_ids: ids(&["1", "2"]),
            original_track_ids: ids(&["1", "2"]),
            current_index: None,
            ..Default::default()
        }
        .normalized();

        assert_eq!(snapshot.current_index, Some(0));
    }

    #[test]
    fn normalize_is_idempotent() {
        let snapshot = PlayerSnapshot {
            queue_track_ids: ids(&["1", "2", "3"]),
            current_index: Some(7),
            ..Default::default()
        };

        let once = snapshot.normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_snapshot_has_no_index() {
        let snapshot = PlayerSnapshot::default().normalized();
        assert_eq!(snapshot.current_index, None);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn snapshot_tolerates_unknown_and_missing_fields() {
        let json = r#"{
            "mode": "repeat-one",
            "queue_track_ids": ["x", "y"],
            "some_future_field": 42
        }"#;

        let snapshot: PlayerSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.mode, PlayMode::RepeatOne);
        assert_eq!(snapshot.queue_track_ids.len(), 2);
        assert_eq!(snapshot.current_index, None);
    }
}
