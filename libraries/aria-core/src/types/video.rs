/// Video domain type
use crate::types::VideoId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Video item from the media catalog
///
/// Videos are indexed by the track cache for the library views but never
/// enter the play queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Unique video identifier
    pub id: VideoId,

    /// Video title
    pub title: String,

    /// Duration in milliseconds
    pub duration_ms: Option<u64>,

    /// File path on disk
    pub locator: PathBuf,
}

impl Video {
    /// Create a new video with minimal metadata
    pub fn new(title: impl Into<String>, locator: PathBuf) -> Self {
        Self {
            id: VideoId::generate(),
            title: title.into(),
            duration_ms: None,
            locator,
        }
    }
}
