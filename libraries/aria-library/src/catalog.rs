//! Media catalog seam
//!
//! The device media index is an external collaborator. Implementations
//! wrap whatever the platform provides (a media-store query on mobile, a
//! directory walker on desktop, a fixture in tests).

use crate::error::Result;
use aria_core::types::{Track, Video};
use async_trait::async_trait;

/// Read-only view of the device media index
///
/// Both queries may fail; callers log the failure and keep their previous
/// state rather than propagating it further.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// List all audio tracks known to the device
    async fn list_tracks(&self) -> Result<Vec<Track>>;

    /// List all videos known to the device
    async fn list_videos(&self) -> Result<Vec<Video>>;
}
