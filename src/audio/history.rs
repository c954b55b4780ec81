//! Recently played tracks
//!
//! Bounded, newest-first list with no duplicates by `Track` equality.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::library::Track;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct RecentHistory {
    /// Most recent = front
    tracks: VecDeque<Arc<Track>>,
    capacity: usize,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            tracks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Move `track` to the front, dropping any older equal entry and
    /// anything past capacity.
    pub fn record(&mut self, track: Arc<Track>) {
        self.tracks.retain(|t| **t != *track);
        self.tracks.push_front(track);
        self.tracks.truncate(self.capacity);
    }

    /// Owned copy, newest first.
    pub fn snapshot(&self) -> Vec<Arc<Track>> {
        self.tracks.iter().cloned().collect()
    }
}

#[cfg(test)]
impl RecentHistory {
    pub fn front(&self) -> Option<&Arc<Track>> {
        self.tracks.front()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn track(n: usize) -> Arc<Track> {
        Arc::new(Track::new(
            format!("Track {n}"),
            "Test Artist",
            "Test Album",
            Duration::from_secs(180),
            format!("/music/{n}.mp3"),
        ))
    }

    #[test]
    fn newest_first() {
        let mut h = RecentHistory::default();
        h.record(track(1));
        h.record(track(2));
        let all = h.snapshot();
        assert_eq!(all[0].title, "Track 2");
        assert_eq!(all[1].title, "Track 1");
    }

    #[test]
    fn replaying_moves_to_front_without_duplicate() {
        let mut h = RecentHistory::default();
        h.record(track(1));
        h.record(track(2));
        h.record(track(1));
        assert_eq!(h.len(), 2);
        assert_eq!(h.front().unwrap().title, "Track 1");
    }

    #[test]
    fn bounded_and_unique_after_many_records() {
        let mut h = RecentHistory::default();
        for i in 0..1000 {
            h.record(track(i % 37));
            assert!(h.len() <= DEFAULT_HISTORY_CAPACITY);
        }
        let all = h.snapshot();
        assert_eq!(all.len(), DEFAULT_HISTORY_CAPACITY);
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| **b != **a));
        }
        // 999 % 37 == 0
        assert_eq!(all[0].title, "Track 0");
    }

    #[test]
    fn snapshot_is_detached() {
        let mut h = RecentHistory::new(3);
        h.record(track(1));
        let snap = h.snapshot();
        h.record(track(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut h = RecentHistory::new(0);
        h.record(track(1));
        h.record(track(2));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len(), 1);
    }
}
