use crate::audio::PlaybackEngine;
use crate::config;

/// Bring the engine's shuffle/repeat flags in line with the configuration.
pub fn apply_playback_defaults(engine: &PlaybackEngine, settings: &config::Settings) {
    if settings.playback.shuffle != engine.is_shuffle() {
        engine.toggle_shuffle();
    }
    if settings.playback.repeat != engine.is_repeat() {
        engine.toggle_repeat();
    }
}
