use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then overlays environment
/// variables (prefix `CADENCE__`) and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENCE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("audio.streaming_extensions")
                .with_list_parse_key("audio.buffered_extensions")
                .with_list_parse_key("library.extensions")
                .with_list_parse_key("effects.bands")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.poll_interval_ms == 0 {
            return Err("audio.poll_interval_ms must be >= 1".to_string());
        }
        if self.playback.history_capacity == 0 {
            return Err("playback.history_capacity must be >= 1".to_string());
        }
        if self.smart.max_songs == 0 {
            return Err("smart.max_songs must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.effects.volume) {
            return Err("effects.volume must be within 0.0..=1.0".to_string());
        }
        let buffered = normalize_extensions(&self.audio.buffered_extensions);
        if let Some(ext) = normalize_extensions(&self.audio.streaming_extensions)
            .into_iter()
            .find(|e| buffered.contains(e))
        {
            return Err(format!(
                "extension '{ext}' is listed as both streaming and buffered"
            ));
        }
        Ok(())
    }
}

/// Lowercase, dot-less, non-empty extension list.
pub fn normalize_extensions(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Resolve the config path from `CADENCE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENCE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadence/config.toml`
/// or `~/.config/cadence/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("cadence").join("config.toml"))
}
