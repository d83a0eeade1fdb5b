//! Aria Player - Media Library
//!
//! The track cache and the seam to the device media catalog.
//!
//! The cache is an explicitly owned component: it is constructed once at
//! startup with its catalog, snapshot store, and config injected, and
//! handed to the playback service. There is no process-wide singleton.
//!
//! Reads are O(1) against the in-memory index. Refreshes build a new
//! index off to the side and swap it in under a brief write lock, so
//! readers are never blocked behind a catalog scan.

#![forbid(unsafe_code)]

mod cache;
mod catalog;
mod error;

pub use cache::{LibraryConfig, TrackCache};
pub use catalog::MediaCatalog;
pub use error::{LibraryError, Result};
