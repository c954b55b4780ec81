//! Named playlists built over the scanned library.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::library::{Playlist, Track};

pub const ALL_SONGS: &str = "All Songs";
pub const FAVORITES: &str = "Favorites";

/// Owns every named playlist.
///
/// Playlists are handed out as `Arc<Playlist>` and edits replace the stored
/// `Arc`, so a playlist already loaded into the engine never changes under it.
#[derive(Debug, Clone)]
pub struct PlaylistManager {
    playlists: BTreeMap<String, Arc<Playlist>>,
}

impl Default for PlaylistManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistManager {
    pub fn new() -> Self {
        let mut playlists = BTreeMap::new();
        for name in [ALL_SONGS, FAVORITES] {
            playlists.insert(name.to_string(), Arc::new(Playlist::new(name)));
        }
        Self { playlists }
    }

    /// Manager whose "All Songs" holds the given library.
    pub fn with_library(library: &[Arc<Track>]) -> Self {
        let mut manager = Self::new();
        manager.refresh_all(library);
        manager
    }

    pub fn create(&mut self, name: &str) -> bool {
        if self.playlists.contains_key(name) {
            return false;
        }
        self.playlists
            .insert(name.to_string(), Arc::new(Playlist::new(name)));
        tracing::debug!(name, "playlist created");
        true
    }

    /// "All Songs" mirrors the library and cannot be deleted.
    pub fn delete(&mut self, name: &str) -> bool {
        if name == ALL_SONGS {
            return false;
        }
        self.playlists.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Playlist>> {
        self.playlists.get(name).cloned()
    }

    pub fn all_songs(&self) -> Arc<Playlist> {
        self.get(ALL_SONGS)
            .unwrap_or_else(|| Arc::new(Playlist::new(ALL_SONGS)))
    }

    pub fn names(&self) -> Vec<String> {
        self.playlists.keys().cloned().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn add_track(&mut self, name: &str, track: Arc<Track>) -> bool {
        self.edit(name, |p| p.add(track))
    }

    pub fn remove_track(&mut self, name: &str, track: &Track) -> bool {
        self.edit(name, |p| p.remove(track))
    }

    pub fn remove_at(&mut self, name: &str, index: usize) -> bool {
        self.edit(name, |p| p.remove_at(index))
    }

    /// Rebuild "All Songs" from `library` and drop entries of other
    /// playlists that are no longer in it.
    pub fn refresh_all(&mut self, library: &[Arc<Track>]) {
        self.playlists.insert(
            ALL_SONGS.to_string(),
            Arc::new(Playlist::with_tracks(ALL_SONGS, library.to_vec())),
        );

        for (name, playlist) in self.playlists.iter_mut() {
            if name == ALL_SONGS {
                continue;
            }
            let kept: Vec<Arc<Track>> = playlist
                .tracks()
                .iter()
                .filter_map(|t| library.iter().find(|l| ***l == **t).cloned())
                .collect();
            if kept.len() != playlist.len() {
                tracing::debug!(
                    name = %name,
                    dropped = playlist.len() - kept.len(),
                    "pruned playlist after rescan"
                );
            }
            *playlist = Arc::new(Playlist::with_tracks(name.clone(), kept));
        }
    }

    /// Case-insensitive substring match on title, artist or album.
    pub fn search(library: &[Arc<Track>], query: &str) -> Playlist {
        let needle = query.trim().to_lowercase();
        let hits = library
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t.artist.to_lowercase().contains(&needle)
                    || t.album.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Playlist::with_tracks(format!("Search: {}", query.trim()), hits)
    }

    fn edit(&mut self, name: &str, f: impl FnOnce(&mut Playlist) -> bool) -> bool {
        let Some(slot) = self.playlists.get_mut(name) else {
            return false;
        };
        let mut next = Playlist::clone(slot);
        if !f(&mut next) {
            return false;
        }
        *slot = Arc::new(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn track(title: &str, artist: &str, album: &str) -> Arc<Track> {
        Arc::new(Track::new(
            title,
            artist,
            album,
            Duration::from_secs(60),
            format!("/music/{title}.mp3"),
        ))
    }

    fn library() -> Vec<Arc<Track>> {
        vec![
            track("Blue", "Anna", "Colors"),
            track("Green", "Bram", "Colors"),
            track("Night Drive", "Anna", "Roads"),
        ]
    }

    #[test]
    fn starts_with_default_playlists() {
        let m = PlaylistManager::new();
        assert_eq!(m.names(), vec![ALL_SONGS.to_string(), FAVORITES.to_string()]);
        assert!(m.all_songs().is_empty());
    }

    #[test]
    fn create_and_delete() {
        let mut m = PlaylistManager::new();
        assert!(m.create("Road Trip"));
        assert!(!m.create("Road Trip"));
        assert!(m.delete("Road Trip"));
        assert!(!m.delete("Road Trip"));
        assert!(!m.delete(ALL_SONGS));
        assert!(m.delete(FAVORITES));
    }

    #[test]
    fn add_rejects_duplicates_and_unknown_names() {
        let lib = library();
        let mut m = PlaylistManager::with_library(&lib);
        assert!(m.add_track(FAVORITES, Arc::clone(&lib[0])));
        assert!(!m.add_track(FAVORITES, Arc::clone(&lib[0])));
        assert!(!m.add_track("missing", Arc::clone(&lib[0])));
        assert_eq!(m.get(FAVORITES).map(|p| p.len()), Some(1));
    }

    #[test]
    fn edits_do_not_touch_handed_out_playlists() {
        let lib = library();
        let mut m = PlaylistManager::with_library(&lib);
        m.add_track(FAVORITES, Arc::clone(&lib[0]));
        let loaded = m.get(FAVORITES).unwrap();

        assert!(m.add_track(FAVORITES, Arc::clone(&lib[1])));
        assert!(m.remove_at(FAVORITES, 0));

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.tracks()[0].title, "Blue");
        assert_eq!(m.get(FAVORITES).unwrap().tracks()[0].title, "Green");
    }

    #[test]
    fn remove_track_and_out_of_range_index() {
        let lib = library();
        let mut m = PlaylistManager::with_library(&lib);
        m.add_track(FAVORITES, Arc::clone(&lib[2]));
        assert!(!m.remove_at(FAVORITES, 5));
        assert!(m.remove_track(FAVORITES, &lib[2]));
        assert!(!m.remove_track(FAVORITES, &lib[2]));
    }

    #[test]
    fn refresh_prunes_vanished_tracks() {
        let lib = library();
        let mut m = PlaylistManager::with_library(&lib);
        m.add_track(FAVORITES, Arc::clone(&lib[0]));
        m.add_track(FAVORITES, Arc::clone(&lib[1]));

        let smaller = vec![Arc::clone(&lib[1]), Arc::clone(&lib[2])];
        m.refresh_all(&smaller);

        assert_eq!(m.all_songs().len(), 2);
        let fav = m.get(FAVORITES).unwrap();
        assert_eq!(fav.len(), 1);
        assert_eq!(fav.tracks()[0].title, "Green");
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let lib = library();
        assert_eq!(PlaylistManager::search(&lib, "anna").len(), 2);
        assert_eq!(PlaylistManager::search(&lib, "COLORS").len(), 2);
        assert_eq!(PlaylistManager::search(&lib, "drive").len(), 1);
        assert_eq!(PlaylistManager::search(&lib, "zzz").len(), 0);
        assert_eq!(PlaylistManager::search(&lib, "  ").len(), 3);
        assert_eq!(PlaylistManager::search(&lib, "blue").name, "Search: blue");
    }
}
