use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};

/// A single audio file known to the library.
///
/// Identity is `(title, artist)`: a re-ripped file with a different path or
/// duration compares equal to the original.
#[derive(Debug)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Duration,
    pub path: PathBuf,
    last_played: Mutex<Option<DateTime<Local>>>,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: Duration,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
            path: path.into(),
            last_played: Mutex::new(None),
        }
    }

    pub fn last_played(&self) -> Option<DateTime<Local>> {
        self.last_played.lock().ok().and_then(|t| *t)
    }

    pub(crate) fn mark_played(&self, at: DateTime<Local>) {
        if let Ok(mut t) = self.last_played.lock() {
            *t = Some(at);
        }
    }

    /// `m:ss` rendering of the track length.
    pub fn formatted_duration(&self) -> String {
        format_mss(self.duration)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.artist == other.artist
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.artist.hash(state);
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.title,
            self.artist,
            self.formatted_duration()
        )
    }
}

/// An ordered list of shared tracks. Playlists never own or copy a `Track`.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub name: String,
    tracks: Vec<Arc<Track>>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_tracks(name: impl Into<String>, tracks: Vec<Arc<Track>>) -> Self {
        let mut playlist = Self::new(name);
        for t in tracks {
            playlist.add(t);
        }
        playlist
    }

    /// Append `track` unless an equal track is already present.
    pub fn add(&mut self, track: Arc<Track>) -> bool {
        if self.tracks.iter().any(|t| **t == *track) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn remove(&mut self, track: &Track) -> bool {
        match self.tracks.iter().position(|t| **t == *track) {
            Some(i) => {
                self.tracks.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.tracks.remove(index);
            true
        } else {
            false
        }
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.tracks.iter().map(|t| t.duration).sum()
    }

    /// `h:mm:ss` when the playlist runs an hour or more, `m:ss` otherwise.
    pub fn formatted_total_duration(&self) -> String {
        let secs = self.total_duration().as_secs();
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{}:{:02}:{:02}", h, m, s)
        } else {
            format!("{}:{:02}", m, s)
        }
    }
}

impl std::fmt::Display for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} songs, {})",
            self.name,
            self.tracks.len(),
            self.formatted_total_duration()
        )
    }
}

/// Format a `Duration` as `m:ss`.
pub fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
