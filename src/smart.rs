//! Generated playlists drawn from the library and listening statistics.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::library::{Playlist, Track};
use crate::stats::PlayStats;

const ENERGETIC: &[&str] = &["rock", "dance", "party", "energy", "power", "fast", "beat"];
const CALM: &[&str] = &["chill", "relax", "calm", "soft", "acoustic", "ambient", "slow"];
const SAD: &[&str] = &["sad", "blue", "melancholy", "tears", "lonely", "broken"];
const HAPPY: &[&str] = &["happy", "joy", "sunshine", "smile", "love", "celebration"];
const WORKOUT: &[&str] = &[
    "rock", "electronic", "dance", "hip", "rap", "metal", "punk", "energy",
];
const CHILL: &[&str] = &[
    "acoustic", "ambient", "chill", "jazz", "classical", "soft", "piano", "guitar",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mood {
    Energetic,
    Chill,
    Sad,
    Happy,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Chill => "chill",
            Mood::Sad => "sad",
            Mood::Happy => "happy",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Mood::Energetic => ENERGETIC,
            Mood::Chill => CALM,
            Mood::Sad => SAD,
            Mood::Happy => HAPPY,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SmartKind {
    /// Newest files first, by path.
    RecentlyAdded,
    MostPlayed,
    RecentlyPlayed,
    NeverPlayed,
    RandomMix,
    /// One artist's tracks; the artist comes from the caller or the stats.
    ArtistFocus,
    Mood(Mood),
    Workout,
    Chill,
    /// Unplayed and rarely played tracks.
    Discovery,
    /// Blend of favourites, recent plays, discoveries and random picks.
    Personalized,
}

impl SmartKind {
    pub const ALL: [SmartKind; 14] = [
        SmartKind::RecentlyAdded,
        SmartKind::MostPlayed,
        SmartKind::RecentlyPlayed,
        SmartKind::NeverPlayed,
        SmartKind::RandomMix,
        SmartKind::ArtistFocus,
        SmartKind::Mood(Mood::Energetic),
        SmartKind::Mood(Mood::Chill),
        SmartKind::Mood(Mood::Sad),
        SmartKind::Mood(Mood::Happy),
        SmartKind::Workout,
        SmartKind::Chill,
        SmartKind::Discovery,
        SmartKind::Personalized,
    ];

    pub fn label(self) -> String {
        match self {
            SmartKind::RecentlyAdded => "Recently Added".to_string(),
            SmartKind::MostPlayed => "Most Played".to_string(),
            SmartKind::RecentlyPlayed => "Recently Played".to_string(),
            SmartKind::NeverPlayed => "Never Played".to_string(),
            SmartKind::RandomMix => "Random Mix".to_string(),
            SmartKind::ArtistFocus => "Artist Focus".to_string(),
            SmartKind::Mood(m) => format!("Mood: {}", m.label()),
            SmartKind::Workout => "Workout".to_string(),
            SmartKind::Chill => "Chill".to_string(),
            SmartKind::Discovery => "Discovery".to_string(),
            SmartKind::Personalized => "Personalized".to_string(),
        }
    }
}

/// Playlist generator over a borrowed library and its play counts.
pub struct SmartPlaylists<'a> {
    library: &'a [Arc<Track>],
    stats: &'a PlayStats,
}

impl<'a> SmartPlaylists<'a> {
    pub fn new(library: &'a [Arc<Track>], stats: &'a PlayStats) -> Self {
        Self { library, stats }
    }

    /// Build a playlist of at most `max` distinct tracks. `artist` is only
    /// read by [`SmartKind::ArtistFocus`].
    pub fn generate(&self, kind: SmartKind, max: usize, artist: Option<&str>) -> Playlist {
        self.generate_with(kind, max, artist, &mut thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        kind: SmartKind,
        max: usize,
        artist: Option<&str>,
        rng: &mut R,
    ) -> Playlist {
        let mut out = Picker::new(max);
        let name = match kind {
            SmartKind::RecentlyAdded => {
                let mut all = self.library.to_vec();
                all.sort_by(|a, b| b.path.cmp(&a.path));
                out.extend(all);
                kind.label()
            }
            SmartKind::MostPlayed => {
                out.extend(self.top(max));
                kind.label()
            }
            SmartKind::RecentlyPlayed => {
                out.extend(self.recently_played());
                kind.label()
            }
            SmartKind::NeverPlayed => {
                out.extend(self.never_played());
                kind.label()
            }
            SmartKind::RandomMix => {
                out.extend(shuffled(self.library.to_vec(), rng));
                kind.label()
            }
            SmartKind::ArtistFocus => {
                let artist = match artist {
                    Some(a) => Some(a.to_string()),
                    None => self.pick_artist(rng),
                };
                let Some(artist) = artist else {
                    return Playlist::new(format!("Smart: {}", kind.label()));
                };
                let needle = artist.to_lowercase();
                out.extend(
                    self.library
                        .iter()
                        .filter(|t| t.artist.to_lowercase().contains(&needle))
                        .cloned(),
                );
                format!("{} ({})", kind.label(), artist)
            }
            SmartKind::Mood(mood) => {
                out.extend(shuffled(self.matching(mood.keywords()), rng));
                kind.label()
            }
            SmartKind::Workout => {
                let mut pool = self.matching(WORKOUT);
                pool.extend(self.top(max / 2));
                out.extend(shuffled(pool, rng));
                kind.label()
            }
            SmartKind::Chill => {
                out.extend(shuffled(self.matching(CHILL), rng));
                out.extend(shuffled(self.library.to_vec(), rng));
                kind.label()
            }
            SmartKind::Discovery => {
                let mut pool: Vec<Arc<Track>> =
                    self.never_played().into_iter().take(max / 2).collect();
                pool.extend(self.rarely_played());
                pool.extend(self.never_played());
                let mut picked = Picker::new(max);
                picked.extend(pool);
                out.extend(shuffled(picked.into_tracks(), rng));
                kind.label()
            }
            SmartKind::Personalized => {
                let mut blend = Picker::new(max);
                blend.extend(self.top(max * 4 / 10));
                blend.extend(self.recently_played().into_iter().take(max * 3 / 10));
                blend.extend(
                    shuffled(self.never_played(), rng)
                        .into_iter()
                        .take(max * 2 / 10),
                );
                blend.extend(shuffled(self.library.to_vec(), rng));
                out.extend(shuffled(blend.into_tracks(), rng));
                kind.label()
            }
        };

        let playlist = Playlist::with_tracks(format!("Smart: {name}"), out.into_tracks());
        tracing::debug!(kind = %kind.label(), tracks = playlist.len(), "smart playlist generated");
        playlist
    }

    /// Library tracks whose title, artist or album mentions any keyword.
    fn matching(&self, keywords: &[&str]) -> Vec<Arc<Track>> {
        self.library
            .iter()
            .filter(|t| {
                let hay = format!("{} {} {}", t.title, t.artist, t.album).to_lowercase();
                keywords.iter().any(|k| hay.contains(k))
            })
            .cloned()
            .collect()
    }

    /// Most played library tracks, highest first.
    fn top(&self, n: usize) -> Vec<Arc<Track>> {
        self.stats
            .top_tracks(n)
            .into_iter()
            .filter_map(|row| {
                self.library
                    .iter()
                    .find(|t| t.title == row.title && t.artist == row.artist)
                    .cloned()
            })
            .collect()
    }

    fn recently_played(&self) -> Vec<Arc<Track>> {
        let mut played: Vec<Arc<Track>> = self
            .library
            .iter()
            .filter(|t| t.last_played().is_some())
            .cloned()
            .collect();
        played.sort_by_key(|t| std::cmp::Reverse(t.last_played()));
        played
    }

    fn never_played(&self) -> Vec<Arc<Track>> {
        self.library
            .iter()
            .filter(|t| self.stats.play_count(t) == 0)
            .cloned()
            .collect()
    }

    fn rarely_played(&self) -> Vec<Arc<Track>> {
        self.library
            .iter()
            .filter(|t| (1..=2).contains(&self.stats.play_count(t)))
            .cloned()
            .collect()
    }

    /// A random artist among the five most played, else the library's first.
    fn pick_artist<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let top = self.stats.top_artists(5);
        if let Some((artist, _)) = top.choose(rng) {
            return Some(artist.clone());
        }
        self.library.first().map(|t| t.artist.clone())
    }
}

fn shuffled<R: Rng + ?Sized>(mut tracks: Vec<Arc<Track>>, rng: &mut R) -> Vec<Arc<Track>> {
    tracks.shuffle(rng);
    tracks
}

/// Collects distinct tracks up to a limit.
struct Picker {
    max: usize,
    tracks: Vec<Arc<Track>>,
}

impl Picker {
    fn new(max: usize) -> Self {
        Self {
            max,
            tracks: Vec::with_capacity(max.min(256)),
        }
    }

    fn extend(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        for t in tracks {
            if self.tracks.len() >= self.max {
                return;
            }
            if !self.tracks.iter().any(|have| **have == *t) {
                self.tracks.push(t);
            }
        }
    }

    fn into_tracks(self) -> Vec<Arc<Track>> {
        self.tracks
    }
}
