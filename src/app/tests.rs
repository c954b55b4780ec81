use super::*;
use std::time::{Duration, Instant};

#[test]
fn navigation_wraps_both_ways() {
    let mut app = App::new(3);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    app.next();
    assert_eq!(app.selected, 2);
}

#[test]
fn navigation_on_empty_list_is_a_no_op() {
    let mut app = App::new(0);
    app.next();
    app.prev();
    app.last();
    assert_eq!(app.selected, 0);
    assert!(!app.has_tracks());
}

#[test]
fn first_and_last() {
    let mut app = App::new(5);
    app.last();
    assert_eq!(app.selected, 4);
    app.first();
    assert_eq!(app.selected, 0);
}

#[test]
fn selection_is_clamped() {
    let mut app = App::new(4);
    app.last();
    assert_eq!(app.selected, 3);
    app.set_len(2);
    assert_eq!(app.selected, 1);
    app.set_len(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn follow_only_when_enabled() {
    let mut app = App::new(5);
    app.follow(3);
    assert_eq!(app.selected, 3);

    app.follow_playback_off();
    app.follow(1);
    assert_eq!(app.selected, 3);

    app.follow_playback_on();
    app.follow(9);
    assert_eq!(app.selected, 3);
}

#[test]
fn panes_toggle_and_replace_each_other() {
    let mut app = App::new(1);
    assert_eq!(app.pane, Pane::None);
    app.toggle_pane(Pane::Recent);
    assert_eq!(app.pane, Pane::Recent);
    app.toggle_pane(Pane::Stats);
    assert_eq!(app.pane, Pane::Stats);
    app.toggle_pane(Pane::Stats);
    assert_eq!(app.pane, Pane::None);
}

#[test]
fn prompt_collects_and_trims_input() {
    let mut app = App::new(1);
    app.push_input('x');
    assert_eq!(app.input(), "");

    app.enter_prompt(Prompt::NewPlaylist);
    for c in " Road Tripp".chars() {
        app.push_input(c);
    }
    app.pop_input();
    assert_eq!(app.input(), " Road Trip");
    assert_eq!(
        app.submit_prompt(),
        Some((Prompt::NewPlaylist, "Road Trip".to_string()))
    );
    assert_eq!(app.prompt(), None);
    assert_eq!(app.input(), "");
}

#[test]
fn blank_or_cancelled_prompt_yields_nothing() {
    let mut app = App::new(1);
    app.enter_prompt(Prompt::Search);
    app.push_input(' ');
    assert_eq!(app.submit_prompt(), None);
    assert_eq!(app.prompt(), None);

    app.enter_prompt(Prompt::Search);
    app.push_input('a');
    app.cancel_prompt();
    assert_eq!(app.prompt(), None);
    assert_eq!(app.submit_prompt(), None);
}

#[test]
fn showing_a_playlist_resets_the_cursor() {
    let mut app = App::new(10);
    app.last();
    app.follow_playback_off();
    app.show_playlist("Favorites", 3);
    assert_eq!(app.playlist_name, "Favorites");
    assert_eq!(app.len(), 3);
    assert_eq!(app.selected, 0);
    assert!(app.follow_playback);
}

#[test]
fn messages_expire() {
    let mut app = App::new(1);
    assert!(app.message().is_none());
    app.set_message("Shuffle on");
    assert_eq!(app.message(), Some("Shuffle on"));
    assert!(!app.message_expired(Instant::now()));
    assert!(app.message_expired(Instant::now() + Duration::from_secs(10)));
    app.clear_message();
    assert!(app.message().is_none());
}
