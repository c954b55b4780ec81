//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::sync::{Arc, LazyLock};
use std::time::Duration;
use std::collections::BTreeMap;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::PlaybackStatus;
use crate::config::UiSettings;
use crate::library::{Playlist, Track, format_mss};
use crate::sleep::SleepAction;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("x", "stop");
    map.insert("h/l", "prev/next");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("t/+", "sleep timer/extend");
    map.insert("R", "recent");
    map.insert("[/]", "playlists");
    map.insert("/", "search");
    map.insert("n", "new playlist");
    map.insert("a/f", "add to list/favorites");
    map.insert("d/D", "remove track/delete list");
    map.insert("m", "smart playlist");
    map.insert("i/X", "stats/reset");
    map.insert("F", "effects");
    map.insert("e/E", "eq preset/eq");
    map.insert("b/w/u", "bass/reverb/surround");
    map.insert("</>", "volume");
    map.insert("q", "quit");
    map
});

/// Render the controls help text in a stable order.
fn controls_text() -> String {
    let order = [
        "j/k", "h/l", "enter", "space/p", "x", "gg/G", "s", "r", "t/+", "R", "[/]", "/", "n",
        "a/f", "d/D", "m", "i/X", "F", "e/E", "b/w/u", "</>", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Titled block of text lines shown beside the track list.
pub struct SidePane {
    pub title: String,
    pub lines: Vec<String>,
}

/// Everything the screen shows that is not UI state.
pub struct Screen {
    pub status: PlaybackStatus,
    pub playlist: Option<Arc<Playlist>>,
    pub side: Option<SidePane>,
    /// Time left on the sleep timer and what it will do.
    pub sleep: Option<(Duration, SleepAction)>,
    /// Playlist that `a` adds to.
    pub target: String,
    pub effects: String,
}

/// The status box contents, joined into one wrapping line.
pub(crate) fn status_text(app: &App, screen: &Screen) -> String {
    let mut parts: Vec<String> = vec![screen.status.to_string()];

    if let Some(kind) = screen.status.backend {
        parts.push(format!("Output: {}", kind.label()));
    }
    if let Some((rem, action)) = screen.sleep {
        parts.push(format!("Sleep: {} ({})", format_mss(rem), action.label()));
    }
    if let Some(pl) = &screen.playlist {
        parts.push(format!("List: {}", pl));
    }
    parts.push(format!("Add to: {}", screen.target));
    parts.push(format!("FX: {}", screen.effects));
    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }
    if let Some(msg) = app.message() {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

/// Visible window `[start, end)` of a list of `total` rows that keeps
/// `selected` centered when possible.
pub(crate) fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn draw_tracks(frame: &mut Frame, area: Rect, app: &App, screen: &Screen) {
    let tracks: &[Arc<Track>] = screen
        .playlist
        .as_ref()
        .map(|p| p.tracks())
        .unwrap_or(&[]);

    let playing = screen
        .status
        .track
        .as_ref()
        .map(|_| screen.status.index);

    // Only build ListItems for the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(tracks.len(), height, app.selected);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, t)| {
            let i = start + offset;
            if Some(i) == playing {
                ListItem::new(format!("♪ {}", t)).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(format!("  {}", t))
            }
        })
        .collect();

    let title = match &screen.playlist {
        Some(p) => format!(" {} ", p.name),
        None => " tracks ".to_string(),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(app.selected - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_side(frame: &mut Frame, area: Rect, pane: &SidePane) {
    let items: Vec<ListItem> = if pane.lines.is_empty() {
        vec![ListItem::new("nothing yet").italic()]
    } else {
        pane.lines.iter().map(|l| ListItem::new(l.as_str())).collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", pane.title)),
    );
    frame.render_widget(list, area);
}

/// Footer text: the open prompt's input line, or the key bindings.
pub(crate) fn footer_text(app: &App) -> String {
    match app.prompt() {
        Some(prompt) => format!("{}: {}_  (enter to confirm, esc to cancel)", prompt.label(), app.input()),
        None => controls_text(),
    }
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, screen: &Screen, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(6),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadence ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, screen))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    if let Some(side) = &screen.side {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        draw_tracks(frame, panes[0], app, screen);
        draw_side(frame, panes[1], side);
    } else {
        draw_tracks(frame, chunks[2], app, screen);
    }

    let footer_title = if app.prompt().is_some() { " input " } else { " controls " };
    let footer = Paragraph::new(footer_text(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(footer_title)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Prompt;
    use crate::audio::{BackendKind, PlaybackState};

    fn screen() -> Screen {
        let track = Arc::new(Track::new(
            "Song",
            "Band",
            "LP",
            Duration::from_secs(200),
            "/m/song.mp3",
        ));
        Screen {
            status: PlaybackStatus {
                state: PlaybackState::Playing,
                track: Some(Arc::clone(&track)),
                index: 0,
                shuffle: false,
                repeat: false,
                backend: Some(BackendKind::Streaming),
                elapsed: None,
                total: Some(track.duration),
            },
            playlist: Some(Arc::new(Playlist::with_tracks("All Songs", vec![track]))),
            side: None,
            sleep: Some((Duration::from_secs(90), SleepAction::FadeOut)),
            target: "Favorites".to_string(),
            effects: "EQ rock, Vol 80%".to_string(),
        }
    }

    #[test]
    fn status_text_includes_engine_line_and_timer() {
        let mut app = App::new(1);
        app.set_message("Repeat on");
        let text = status_text(&app, &screen());
        assert!(text.starts_with("Playing: Song - Band (3:20) [3:20]"));
        assert!(text.contains("Sleep: 1:30 (fade out)"));
        assert!(text.contains("List: All Songs (1 songs, 3:20)"));
        assert!(text.contains("Add to: Favorites"));
        assert!(text.contains("FX: EQ rock, Vol 80%"));
        assert!(text.ends_with("Repeat on"));
    }

    #[test]
    fn window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5));
        assert_eq!(visible_window(100, 10, 50), (45, 55));
        assert_eq!(visible_window(100, 10, 2), (0, 10));
        assert_eq!(visible_window(100, 10, 99), (90, 100));
        assert_eq!(visible_window(100, 0, 99), (0, 100));
    }

    #[test]
    fn controls_list_every_binding() {
        let text = controls_text();
        for key in [
            "[x] stop",
            "[R] recent",
            "[t/+]",
            "[/] search",
            "[m] smart playlist",
            "[</>] volume",
            "[q] quit",
        ] {
            assert!(text.contains(key), "missing {key}");
        }
        assert_eq!(CONTROLS_MAP.len(), text.matches(" | ").count() + 1);
    }

    #[test]
    fn footer_shows_prompt_input() {
        let mut app = App::new(1);
        assert_eq!(footer_text(&app), controls_text());
        app.enter_prompt(Prompt::Search);
        app.push_input('a');
        assert!(footer_text(&app).starts_with("search: a_"));
    }
}
