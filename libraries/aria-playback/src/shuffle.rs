//! Shuffle helpers for the queue engine
//!
//! Randomized navigation draws an index with replacement (the same track
//! can repeat); entering shuffle mode permutes the queue with the current
//! track pinned to the front.

use crate::types::QueueTrack;
use aria_core::types::TrackId;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Uniform random index into a queue of `len` tracks
///
/// Draws over the full range including the current position, so the same
/// track may be picked twice in a row.
pub(crate) fn random_index(len: usize) -> usize {
    debug_assert!(len > 0);
    thread_rng().gen_range(0..len)
}

/// Build a shuffled play order with the current track first
///
/// The current track (if any) is removed, the remainder is randomly
/// permuted, and the current track is reinserted at the front so the
/// cursor lands on index 0 without interrupting playback.
pub(crate) fn shuffled_with_current_first(
    tracks: &[QueueTrack],
    current_id: Option<&TrackId>,
) -> Vec<QueueTrack> {
    let mut rng = thread_rng();

    let mut current = None;
    let mut rest: Vec<QueueTrack> = Vec::with_capacity(tracks.len());
    for track in tracks {
        if current.is_none() && current_id == Some(&track.id) {
            current = Some(track.clone());
        } else {
            rest.push(track.clone());
        }
    }

    rest.shuffle(&mut rng);

    let mut shuffled = Vec::with_capacity(tracks.len());
    if let Some(track) = current {
        shuffled.push(track);
    }
    shuffled.extend(rest);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn track(id: &str) -> QueueTrack {
        QueueTrack {
            id: TrackId::new(id),
            title: format!("Track {id}"),
            artist: None,
            album: None,
            duration_ms: Some(180_000),
            locator: PathBuf::from(format!("/music/{id}.mp3")),
        }
    }

    #[test]
    fn random_index_stays_in_range() {
        for _ in 0..100 {
            assert!(random_index(3) < 3);
        }
        assert_eq!(random_index(1), 0);
    }

    #[test]
    fn shuffle_pins_current_track_first() {
        let tracks = vec![track("a"), track("b"), track("c"), track("d")];
        let current = TrackId::new("c");

        let shuffled = shuffled_with_current_first(&tracks, Some(&current));
        assert_eq!(shuffled[0].id, current);
        assert_eq!(shuffled.len(), 4);
    }

    #[test]
    fn shuffle_preserves_track_multiset() {
        let tracks = vec![track("1"), track("2"), track("3"), track("4"), track("5")];

        let shuffled = shuffled_with_current_first(&tracks, Some(&TrackId::new("2")));

        let before: HashSet<String> = tracks.iter().map(|t| t.id.to_string()).collect();
        let after: HashSet<String> = shuffled.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_without_current_permutes_everything() {
        let tracks = vec![track("1"), track("2"), track("3")];

        let shuffled = shuffled_with_current_first(&tracks, None);
        assert_eq!(shuffled.len(), 3);
    }

    #[test]
    fn shuffle_handles_duplicate_ids() {
        // Only the first occurrence of the current id is pinned
        let tracks = vec![track("x"), track("x"), track("y")];
        let current = TrackId::new("x");

        let shuffled = shuffled_with_current_first(&tracks, Some(&current));
        assert_eq!(shuffled[0].id, current);
        assert_eq!(shuffled.len(), 3);
    }

    #[test]
    fn shuffle_empty_queue() {
        let shuffled = shuffled_with_current_first(&[], None);
        assert!(shuffled.is_empty());
    }
}
