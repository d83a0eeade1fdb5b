//! Aria Player - Snapshot Persistence
//!
//! Durable storage for the two state records Aria keeps across process
//! restarts: the playback snapshot (queue, cursor, mode) and the library
//! cache snapshot (tracks and videos).
//!
//! Both are stored as versionless keyed JSON records. Writes go through a
//! temp-file-and-rename so a crash mid-write can never corrupt the prior
//! snapshot. Reads treat a corrupt file the same as a missing one: log a
//! warning and report "no snapshot" rather than surface an error.

#![forbid(unsafe_code)]

mod error;
mod library;
mod player_state;
mod snapshot;

pub use error::{Result, StorageError};
pub use library::{LibrarySnapshot, LibraryStore};
pub use player_state::PlayerStateStore;
pub use snapshot::SnapshotFile;
