//! Listening statistics.
//!
//! The engine reports every fresh playback start through [`PlayRecorder`];
//! [`PlayStats`] aggregates those reports in memory.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::library::Track;

/// Sink for "a track started playing" reports.
///
/// Called with the engine's lock held, so implementations must be quick
/// and must not call back into the engine.
pub trait PlayRecorder: Send + Sync {
    fn record_play(&self, track: &Track);
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl PlayRecorder for NoopRecorder {
    fn record_play(&self, _track: &Track) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TrackKey {
    title: String,
    artist: String,
}

impl TrackKey {
    fn of(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TrackTally {
    plays: u32,
    listened: Duration,
}

#[derive(Debug, Default)]
struct Tallies {
    tracks: HashMap<TrackKey, TrackTally>,
    artists: HashMap<String, u32>,
    days: HashMap<NaiveDate, u32>,
    session: u32,
}

/// One row of [`PlayStats::top_tracks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPlays {
    pub title: String,
    pub artist: String,
    pub plays: u32,
    pub listened: Duration,
}

/// In-memory play counters, keyed like `Track` equality (title, artist).
#[derive(Debug, Default)]
pub struct PlayStats {
    inner: Mutex<Tallies>,
}

impl PlayStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tallies> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Same as [`PlayRecorder::record_play`] but with an explicit date.
    pub fn record_on(&self, track: &Track, day: NaiveDate) {
        let mut t = self.lock();
        let tally = t.tracks.entry(TrackKey::of(track)).or_default();
        tally.plays += 1;
        tally.listened += track.duration;
        *t.artists.entry(track.artist.clone()).or_default() += 1;
        *t.days.entry(day).or_default() += 1;
        t.session += 1;
    }

    pub fn play_count(&self, track: &Track) -> u32 {
        self.lock()
            .tracks
            .get(&TrackKey::of(track))
            .map_or(0, |t| t.plays)
    }

    pub fn total_plays(&self) -> u32 {
        self.lock().tracks.values().map(|t| t.plays).sum()
    }

    /// Plays recorded since this recorder was created or reset.
    pub fn session_plays(&self) -> u32 {
        self.lock().session
    }

    pub fn plays_on(&self, day: NaiveDate) -> u32 {
        self.lock().days.get(&day).copied().unwrap_or(0)
    }

    pub fn plays_today(&self) -> u32 {
        self.plays_on(Local::now().date_naive())
    }

    pub fn total_listened(&self) -> Duration {
        self.lock().tracks.values().map(|t| t.listened).sum()
    }

    /// Most played tracks, highest first; ties by title.
    pub fn top_tracks(&self, n: usize) -> Vec<TrackPlays> {
        let t = self.lock();
        let mut rows: Vec<TrackPlays> = t
            .tracks
            .iter()
            .map(|(k, v)| TrackPlays {
                title: k.title.clone(),
                artist: k.artist.clone(),
                plays: v.plays,
                listened: v.listened,
            })
            .collect();
        rows.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| a.title.cmp(&b.title)));
        rows.truncate(n);
        rows
    }

    /// Most played artists, highest first; ties by name.
    pub fn top_artists(&self, n: usize) -> Vec<(String, u32)> {
        let t = self.lock();
        let mut rows: Vec<(String, u32)> =
            t.artists.iter().map(|(a, c)| (a.clone(), *c)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows.truncate(n);
        rows
    }

    pub fn reset(&self) {
        *self.lock() = Tallies::default();
    }
}

impl PlayRecorder for PlayStats {
    fn record_play(&self, track: &Track) {
        self.record_on(track, Local::now().date_naive());
    }
}
