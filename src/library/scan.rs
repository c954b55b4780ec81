use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read a single file into a `Track`, falling back to the file stem and
/// placeholder artist/album when tags are missing or unreadable.
fn read_track(path: &Path, settings: &LibrarySettings) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = UNKNOWN_ARTIST.to_string();
    let mut album = UNKNOWN_ALBUM.to_string();
    let mut duration = Duration::ZERO;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Duration::from_secs(tagged.properties().duration().as_secs());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = non_empty(tag.title()) {
                    title = v;
                }
                if let Some(v) = non_empty(tag.artist()) {
                    artist = v;
                }
                if let Some(v) = non_empty(tag.album()) {
                    album = v;
                }
            }
        }
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    if duration.is_zero() {
        duration = Duration::from_secs(settings.fallback_duration_secs);
    }

    Track::new(title, artist, album, duration, path)
}

/// Walk `dir` and return every audio file as a shared `Track`, sorted by
/// `title - artist` case-insensitively.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Arc<Track>> {
    let mut tracks: Vec<Arc<Track>> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(Arc::new(read_track(path, settings)));
        }
    }

    tracing::info!(dir = %dir.display(), count = tracks.len(), "library scanned");

    tracks.sort_by_key(|t| format!("{} - {}", t.title, t.artist).to_lowercase());
    tracks
}
