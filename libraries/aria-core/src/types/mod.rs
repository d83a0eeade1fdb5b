//! Domain types for Aria Player

mod ids;
mod media;
mod player_state;
mod track;
mod video;

pub use ids::{TrackId, VideoId};
pub use media::MediaItem;
pub use player_state::{PlayMode, PlayerSnapshot, TrackSummary};
pub use track::Track;
pub use video::Video;
