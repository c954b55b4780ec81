//! UI state: selection within the loaded playlist and screen toggles.

use std::time::{Duration, Instant};

const MESSAGE_TTL: Duration = Duration::from_secs(4);

/// Side pane next to the track list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    None,
    Recent,
    Stats,
    Effects,
}

/// What the footer input line is collecting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Search,
    NewPlaylist,
}

impl Prompt {
    pub fn label(self) -> &'static str {
        match self {
            Prompt::Search => "search",
            Prompt::NewPlaylist => "new playlist",
        }
    }
}

/// The main application model.
pub struct App {
    pub selected: usize,
    len: usize,

    /// Cursor jumps to the playing track whenever it changes.
    pub follow_playback: bool,
    pub pane: Pane,
    pub current_dir: Option<String>,
    pub playlist_name: String,

    prompt: Option<Prompt>,
    input: String,

    message: Option<(String, Instant)>,
}

impl App {
    /// Create an `App` over a playlist of `len` tracks.
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            len,
            follow_playback: true,
            pane: Pane::None,
            current_dir: None,
            playlist_name: String::new(),
            prompt: None,
            input: String::new(),
            message: None,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn has_tracks(&self) -> bool {
        self.len > 0
    }

    /// Resize after a playlist change, keeping the selection in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Move selection down, wrapping at the end.
    pub fn next(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + 1) % self.len;
        }
    }

    /// Move selection up, wrapping at the top.
    pub fn prev(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + self.len - 1) % self.len;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Snap the cursor to `playing` when following playback.
    pub fn follow(&mut self, playing: usize) {
        if self.follow_playback && playing < self.len {
            self.selected = playing;
        }
    }

    /// Show `pane`, or hide it when it is already showing.
    pub fn toggle_pane(&mut self, pane: Pane) {
        self.pane = if self.pane == pane { Pane::None } else { pane };
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Start collecting text for `prompt`, discarding any earlier input.
    pub fn enter_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        self.input.clear();
    }

    pub fn push_input(&mut self, c: char) {
        if self.prompt.is_some() {
            self.input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.input.clear();
    }

    /// Close the prompt and hand back its trimmed text. Blank input counts
    /// as a cancel.
    pub fn submit_prompt(&mut self) -> Option<(Prompt, String)> {
        let prompt = self.prompt.take()?;
        let text = std::mem::take(&mut self.input).trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some((prompt, text))
    }

    /// Switch the list to a different playlist of `len` tracks.
    pub fn show_playlist(&mut self, name: &str, len: usize) {
        self.playlist_name = name.to_string();
        self.set_len(len);
        self.first();
        self.follow_playback_on();
    }

    /// Show a transient line in the status box.
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some((msg.into(), Instant::now()));
    }

    pub fn message(&self) -> Option<&str> {
        self.message_at(Instant::now())
    }

    fn message_at(&self, now: Instant) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < MESSAGE_TTL)
            .map(|(m, _)| m.as_str())
    }

    pub(crate) fn message_expired(&self, now: Instant) -> bool {
        self.message.is_some() && self.message_at(now).is_none()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}
