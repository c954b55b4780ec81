use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadence/config.toml` or `~/.config/cadence/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENCE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub sleep: SleepSettings,
    pub smart: SmartSettings,
    pub effects: EffectsSettings,
    pub ui: UiSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Extensions decoded frame by frame on a worker thread (no pause/seek).
    pub streaming_extensions: Vec<String>,
    /// Extensions loaded fully into memory (pause, resume and position).
    pub buffered_extensions: Vec<String>,
    /// How often a backend worker checks for end of media (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            streaming_extensions: vec![
                "mp3".into(),
                "ogg".into(),
                "flac".into(),
                "m4a".into(),
                "aac".into(),
            ],
            buffered_extensions: vec!["wav".into(), "aiff".into(), "aif".into(), "au".into()],
            poll_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Whether repeat-one starts enabled.
    pub repeat: bool,
    /// Number of tracks kept in the recently-played list.
    pub history_capacity: usize,
    /// Count plays for the statistics pane and smart playlists.
    pub record_stats: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: false,
            history_capacity: 20,
            record_stats: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Duration assumed for files whose length cannot be read.
    pub fallback_duration_secs: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "wav".into(),
                "aiff".into(),
                "au".into(),
                "flac".into(),
                "m4a".into(),
                "aac".into(),
                "ogg".into(),
            ],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            fallback_duration_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SleepSettings {
    /// Minutes used when the timer is armed from the UI.
    pub default_minutes: u64,
    /// What happens when the timer fires.
    pub action: SleepActionSetting,
    /// Length of the fade-out countdown (clamped to 1..=60).
    pub fade_out_seconds: u64,
}

impl Default for SleepSettings {
    fn default() -> Self {
        Self {
            default_minutes: 30,
            action: SleepActionSetting::FadeOut,
            fade_out_seconds: 10,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SleepActionSetting {
    Stop,
    Pause,
    #[serde(alias = "fade_out", alias = "fadeout", alias = "fade")]
    FadeOut,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmartSettings {
    /// Upper bound on the length of a generated playlist.
    pub max_songs: usize,
}

impl Default for SmartSettings {
    fn default() -> Self {
        Self { max_songs: 25 }
    }
}

/// Starting values for the effects panel. Stored and displayed only;
/// nothing here touches the audio signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectsSettings {
    /// Whether the equalizer starts enabled.
    pub equalizer: bool,
    /// Preset name (`flat`, `rock`, `pop`, `classical`, `jazz`, `electronic`).
    pub preset: String,
    /// Per-band gains in dB, lowest band first. Overrides the preset when set.
    pub bands: Vec<f32>,
    /// Levels 0..=10; 0 leaves the effect off.
    pub bass_boost: u8,
    pub reverb: u8,
    pub surround: u8,
    /// Master volume, 0.0..=1.0.
    pub volume: f32,
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self {
            equalizer: false,
            preset: "flat".to_string(),
            bands: Vec::new(),
            bass_boost: 0,
            reverb: 0,
            surround: 0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the recently-played pane starts visible.
    pub show_recent: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cadence ~ ".to_string(),
            show_recent: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Directory for the daily rolling log file.
    pub directory: String,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            directory: ".logs".to_string(),
            filter: "cadence=info,warn".to_string(),
        }
    }
}
