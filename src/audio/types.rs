//! Audio-related small types.
//!
//! Playback state, backend capability flags, format classes and the status
//! snapshot handed to the UI.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AudioSettings, normalize_extensions};
use crate::library::{Track, format_mss};

/// The engine's externally visible state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No playlist loaded.
    #[default]
    Idle,
    /// Playlist loaded, nothing started yet.
    Loaded,
    Playing,
    Paused,
    Stopped,
}

/// What a backend can do beyond start/close.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `pause()` / `resume()` keep the exact position.
    pub pause: bool,
    /// `position()` reports true elapsed time.
    pub position: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        pause: false,
        position: false,
    };
    pub const FULL: Self = Self {
        pause: true,
        position: true,
    };
}

/// Which backend variant is driving a track. Used for logs and display only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Streaming,
    BufferedClip,
    Simulated,
}

impl BackendKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Streaming => "stream",
            Self::BufferedClip => "clip",
            Self::Simulated => "simulated",
        }
    }
}

/// Format class derived from the file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormatClass {
    /// Compressed formats decoded frame by frame.
    Streaming,
    /// Uncompressed/container formats loaded whole.
    Buffered,
    /// Anything the real backends do not handle.
    Unknown,
}

/// Extension lists used to route a path to a `FormatClass`.
#[derive(Clone, Debug)]
pub struct FormatTable {
    streaming: Vec<String>,
    buffered: Vec<String>,
}

impl FormatTable {
    pub fn new(streaming: &[String], buffered: &[String]) -> Self {
        Self {
            streaming: normalize_extensions(streaming),
            buffered: normalize_extensions(buffered),
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(
            &settings.streaming_extensions,
            &settings.buffered_extensions,
        )
    }

    /// Case-insensitive lookup by extension only.
    pub fn classify(&self, path: &Path) -> FormatClass {
        let Some(ext) = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
        else {
            return FormatClass::Unknown;
        };

        if self.streaming.contains(&ext) {
            FormatClass::Streaming
        } else if self.buffered.contains(&ext) {
            FormatClass::Buffered
        } else {
            FormatClass::Unknown
        }
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::from_settings(&AudioSettings::default())
    }
}

/// Point-in-time view of the engine returned by `PlaybackEngine::status`.
#[derive(Clone, Debug)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub track: Option<Arc<Track>>,
    pub index: usize,
    pub shuffle: bool,
    pub repeat: bool,
    pub backend: Option<BackendKind>,
    /// `None` when the live backend cannot report a position.
    pub elapsed: Option<Duration>,
    pub total: Option<Duration>,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(track) = &self.track else {
            return write!(f, "No song loaded");
        };

        let state = match self.state {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            _ => "Stopped",
        };
        write!(f, "{}: {}", state, track)?;
        if self.shuffle {
            write!(f, " [Shuffle]")?;
        }
        if self.repeat {
            write!(f, " [Repeat]")?;
        }

        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            let total = self.total.unwrap_or(track.duration);
            match self.elapsed {
                Some(elapsed) => write!(
                    f,
                    " [{} / {}]",
                    format_mss(elapsed.min(total)),
                    format_mss(total)
                )?,
                None => write!(f, " [{}]", format_mss(total))?,
            }
        }
        Ok(())
    }
}
