//! What the event loop acts on besides the UI model: the engine, the sleep
//! timer, playlists, statistics and the effects store.

use std::sync::Arc;

use crate::app::{App, Pane};
use crate::audio::{PlaybackEngine, PlaybackState};
use crate::effects::Effects;
use crate::library::{Playlist, Track, format_mss};
use crate::playlists::{ALL_SONGS, FAVORITES, PlaylistManager};
use crate::sleep::SleepTimer;
use crate::smart::{SmartKind, SmartPlaylists};
use crate::stats::PlayStats;
use crate::ui::SidePane;

const TOP_ROWS: usize = 5;

pub struct Context {
    pub engine: Arc<PlaybackEngine>,
    pub timer: SleepTimer<PlaybackEngine>,
    pub library: Vec<Arc<Track>>,
    pub playlists: PlaylistManager,
    pub stats: Arc<PlayStats>,
    pub effects: Effects,
    /// False when plays are not being counted.
    pub recording: bool,
    /// Playlist that `add_selected` writes to.
    pub target: String,
    next_smart: usize,
}

impl Context {
    pub fn new(
        engine: Arc<PlaybackEngine>,
        library: Vec<Arc<Track>>,
        stats: Arc<PlayStats>,
        effects: Effects,
    ) -> Self {
        let playlists = PlaylistManager::with_library(&library);
        Self {
            timer: SleepTimer::new(Arc::clone(&engine)),
            engine,
            library,
            playlists,
            stats,
            effects,
            recording: true,
            target: FAVORITES.to_string(),
            next_smart: 0,
        }
    }

    /// Load `playlist` into the engine and point the list at it.
    pub fn show(&self, app: &mut App, playlist: Arc<Playlist>) {
        self.engine.load_playlist(Some(Arc::clone(&playlist)));
        app.show_playlist(&playlist.name, playlist.len());
    }

    /// Track under the cursor.
    pub fn selected_track(&self, app: &App) -> Option<Arc<Track>> {
        self.engine.current_playlist()?.get(app.selected).cloned()
    }

    fn is_active(&self) -> bool {
        matches!(
            self.engine.state(),
            PlaybackState::Playing | PlaybackState::Paused
        )
    }

    /// Re-show `name` after an edit if it is on screen and idle. Returns
    /// false when the edit only lands on the next load.
    fn refresh(&self, app: &mut App, name: &str) -> bool {
        if app.playlist_name != name || self.is_active() {
            return false;
        }
        let Some(p) = self.playlists.get(name) else {
            return false;
        };
        self.engine.load_playlist(Some(Arc::clone(&p)));
        app.set_len(p.len());
        true
    }

    /// Load the managed playlist after (or before) the one on screen.
    pub fn cycle_playlist(&self, app: &mut App, forward: bool) {
        let names = self.playlists.names();
        if names.is_empty() {
            return;
        }
        let next = match names.iter().position(|n| *n == app.playlist_name) {
            Some(i) if forward => (i + 1) % names.len(),
            Some(i) => (i + names.len() - 1) % names.len(),
            None => 0,
        };
        if let Some(p) = self.playlists.get(&names[next]) {
            self.show(app, p);
        }
    }

    pub fn create_playlist(&mut self, app: &mut App, name: &str) {
        if self.playlists.create(name) {
            self.target = name.to_string();
            app.set_message(format!("Created {name}; [a] adds here"));
        } else {
            app.set_message(format!("{name} already exists"));
        }
    }

    /// Add the selected track to `name`, creating Favorites on demand.
    pub fn add_selected(&mut self, app: &mut App, name: &str) {
        let Some(track) = self.selected_track(app) else {
            return;
        };
        if name == FAVORITES {
            self.playlists.create(FAVORITES);
        }
        if !self.playlists.add_track(name, Arc::clone(&track)) {
            app.set_message(format!("{} is already in {name}", track.title));
            return;
        }
        let note = if self.refresh(app, name) { "" } else { " (shown on reload)" };
        app.set_message(format!("Added {} to {name}{note}", track.title));
    }

    /// Drop the selected entry from the playlist on screen.
    pub fn remove_selected(&mut self, app: &mut App) {
        let name = app.playlist_name.clone();
        if name == ALL_SONGS || self.playlists.get(&name).is_none() {
            app.set_message(format!("{name} cannot be edited"));
            return;
        }
        let Some(track) = self.selected_track(app) else {
            return;
        };
        // The view can lag behind the stored playlist while something plays.
        let in_sync = self
            .playlists
            .get(&name)
            .and_then(|p| p.get(app.selected).cloned())
            .is_some_and(|t| *t == *track);
        let removed = if in_sync {
            self.playlists.remove_at(&name, app.selected)
        } else {
            self.playlists.remove_track(&name, &track)
        };
        if !removed {
            return;
        }
        let note = if self.refresh(app, &name) { "" } else { " (shown on reload)" };
        app.set_message(format!("Removed {} from {name}{note}", track.title));
    }

    /// Delete the managed playlist on screen and fall back to All Songs.
    pub fn delete_current(&mut self, app: &mut App) {
        let name = app.playlist_name.clone();
        if !self.playlists.delete(&name) {
            app.set_message(format!("{name} cannot be deleted"));
            return;
        }
        if self.target == name {
            self.target = FAVORITES.to_string();
        }
        self.show(app, self.playlists.all_songs());
        app.set_message(format!("Deleted {name}"));
    }

    pub fn search(&self, app: &mut App, query: &str) {
        let hits = PlaylistManager::search(&self.library, query);
        if hits.is_empty() {
            app.set_message(format!("No matches for \"{query}\""));
            return;
        }
        let found = hits.len();
        self.show(app, Arc::new(hits));
        app.set_message(format!("{found} matches for \"{query}\""));
    }

    /// Generate and load the next smart playlist kind in turn.
    pub fn next_smart(&mut self, app: &mut App, max: usize) {
        let kind = SmartKind::ALL[self.next_smart % SmartKind::ALL.len()];
        self.next_smart += 1;

        let artist = match kind {
            SmartKind::ArtistFocus => self.selected_track(app).map(|t| t.artist.clone()),
            _ => None,
        };
        let playlist = SmartPlaylists::new(&self.library, &self.stats).generate(
            kind,
            max,
            artist.as_deref(),
        );
        let len = playlist.len();
        self.show(app, Arc::new(playlist));
        app.set_message(format!("{} ({len} tracks)", kind.label()));
    }

    pub fn reset_stats(&self, app: &mut App) {
        self.stats.reset();
        app.set_message("Statistics cleared");
    }

    fn stats_lines(&self, app: &App) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Plays: {} total, {} today, {} this session",
                self.stats.total_plays(),
                self.stats.plays_today(),
                self.stats.session_plays()
            ),
            format!("Listened: {}", format_mss(self.stats.total_listened())),
        ];
        if !self.recording {
            lines.push("Recording is off".to_string());
        }
        if let Some(t) = self.engine.current_track() {
            lines.push(format!(
                "Current: {} ({} plays)",
                t.title,
                self.stats.play_count(&t)
            ));
        }
        if let Some(t) = self.selected_track(app) {
            lines.push(format!(
                "Selected: {} ({} plays)",
                t.title,
                self.stats.play_count(&t)
            ));
        }

        lines.push(String::new());
        lines.push("Top tracks".to_string());
        for (i, row) in self.stats.top_tracks(TOP_ROWS).iter().enumerate() {
            lines.push(format!(
                "{:>2}. {} - {} ({}, {})",
                i + 1,
                row.title,
                row.artist,
                row.plays,
                format_mss(row.listened)
            ));
        }

        lines.push(String::new());
        lines.push("Top artists".to_string());
        for (i, (artist, plays)) in self.stats.top_artists(TOP_ROWS).iter().enumerate() {
            lines.push(format!("{:>2}. {} ({})", i + 1, artist, plays));
        }
        lines
    }

    /// Contents of the side pane selected in `app`, if any.
    pub fn side_pane(&self, app: &App) -> Option<SidePane> {
        match app.pane {
            Pane::None => None,
            Pane::Recent => Some(SidePane {
                title: "recently played".to_string(),
                lines: self
                    .engine
                    .recently_played()
                    .iter()
                    .map(|t| format!("{} - {}", t.title, t.artist))
                    .collect(),
            }),
            Pane::Stats => Some(SidePane {
                title: "statistics".to_string(),
                lines: self.stats_lines(app),
            }),
            Pane::Effects => Some(SidePane {
                title: "effects".to_string(),
                lines: self.effects.describe(),
            }),
        }
    }
}
