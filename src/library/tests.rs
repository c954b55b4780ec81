use super::*;
use std::sync::Arc;
use std::time::Duration;

fn t(title: &str, artist: &str, secs: u64, path: &str) -> Arc<Track> {
    Arc::new(Track::new(
        title,
        artist,
        "Album",
        Duration::from_secs(secs),
        path,
    ))
}

#[test]
fn tracks_compare_by_title_and_artist_only() {
    let a = t("Song", "Band", 200, "/music/a.mp3");
    let rerip = t("Song", "Band", 201, "/music/rerip/a.flac");
    let other = t("Song", "Other Band", 200, "/music/a.mp3");
    assert_eq!(*a, *rerip);
    assert_ne!(*a, *other);
}

#[test]
fn track_display_matches_status_format() {
    let a = t("Song", "Band", 225, "/music/a.mp3");
    assert_eq!(a.to_string(), "Song - Band (3:45)");
    assert_eq!(a.formatted_duration(), "3:45");
}

#[test]
fn mark_played_sets_timestamp_through_shared_reference() {
    let a = t("Song", "Band", 10, "/music/a.mp3");
    let shared = Arc::clone(&a);
    assert!(a.last_played().is_none());
    shared.mark_played(chrono::Local::now());
    assert!(a.last_played().is_some());
}

#[test]
fn playlist_rejects_duplicates_and_removes_by_equality() {
    let mut p = Playlist::new("Mix");
    assert!(p.add(t("A", "X", 60, "/a.mp3")));
    assert!(!p.add(t("A", "X", 61, "/other/a.mp3")));
    assert!(p.add(t("B", "X", 60, "/b.mp3")));
    assert_eq!(p.len(), 2);

    assert!(p.remove(&t("A", "X", 0, "")));
    assert_eq!(p.len(), 1);
    assert!(!p.remove_at(5));
    assert!(p.remove_at(0));
    assert!(p.is_empty());
}

#[test]
fn playlist_total_duration_formats_hours() {
    let p = Playlist::with_tracks(
        "Long",
        vec![t("A", "X", 3000, "/a"), t("B", "X", 700, "/b")],
    );
    assert_eq!(p.formatted_total_duration(), "1:01:40");
    assert_eq!(p.to_string(), "Long (2 songs, 1:01:40)");

    let short = Playlist::with_tracks("Short", vec![t("A", "X", 75, "/a")]);
    assert_eq!(short.formatted_total_duration(), "1:15");
}
