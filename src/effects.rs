//! Effect settings shown in the effects pane.
//!
//! A parameter store only: equalizer gains, effect levels and the master
//! volume are kept and rendered, but no DSP runs on the audio path.

use crate::config::EffectsSettings;

/// Equalizer band centre frequencies, lowest first.
pub const BANDS: [&str; 10] = [
    "60Hz", "170Hz", "310Hz", "600Hz", "1kHz", "3kHz", "6kHz", "12kHz", "14kHz", "16kHz",
];

/// Band gains are clamped to +/- this many dB.
pub const MAX_GAIN_DB: f32 = 12.0;

pub const MAX_LEVEL: u8 = 10;

/// Cells on each side of the centre mark in [`level_bar`].
const BAR_HALF: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preset {
    Flat,
    Rock,
    Pop,
    Classical,
    Jazz,
    Electronic,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Flat,
        Preset::Rock,
        Preset::Pop,
        Preset::Classical,
        Preset::Jazz,
        Preset::Electronic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preset::Flat => "flat",
            Preset::Rock => "rock",
            Preset::Pop => "pop",
            Preset::Classical => "classical",
            Preset::Jazz => "jazz",
            Preset::Electronic => "electronic",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(name))
    }

    /// Gains for the lower eight bands; the top two stay flat.
    fn gains(self) -> [f32; 8] {
        match self {
            Preset::Flat => [0.0; 8],
            Preset::Rock => [5.0, 3.0, -2.0, -1.0, 2.0, 4.0, 3.0, 2.0],
            Preset::Pop => [2.0, 1.0, 0.0, 1.0, 3.0, 4.0, 3.0, 2.0],
            Preset::Classical => [3.0, 2.0, 1.0, 0.0, -1.0, 1.0, 3.0, 4.0],
            Preset::Jazz => [4.0, 2.0, 1.0, 2.0, -1.0, 1.0, 2.0, 3.0],
            Preset::Electronic => [6.0, 4.0, 1.0, 0.0, -1.0, 2.0, 4.0, 5.0],
        }
    }

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    BassBoost,
    Reverb,
    Surround,
}

impl Effect {
    pub fn label(self) -> &'static str {
        match self {
            Effect::BassBoost => "Bass boost",
            Effect::Reverb => "Reverb",
            Effect::Surround => "Surround",
        }
    }

    /// Level used when the effect is switched on from zero.
    fn default_level(self) -> u8 {
        match self {
            Effect::BassBoost => 5,
            Effect::Reverb => 3,
            Effect::Surround => 5,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Level {
    enabled: bool,
    level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effects {
    eq_enabled: bool,
    bands: [f32; 10],
    /// `None` once a band has been set by hand.
    preset: Option<Preset>,
    bass: Level,
    reverb: Level,
    surround: Level,
    volume: f32,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            eq_enabled: false,
            bands: [0.0; 10],
            preset: Some(Preset::Flat),
            bass: Level::default(),
            reverb: Level::default(),
            surround: Level::default(),
            volume: 1.0,
        }
    }
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &EffectsSettings) -> Self {
        let mut fx = Self::new();
        match Preset::from_name(&settings.preset) {
            Some(p) => fx.load_preset(p),
            None => tracing::warn!(preset = %settings.preset, "unknown equalizer preset, using flat"),
        }
        for (i, gain) in settings.bands.iter().take(BANDS.len()).enumerate() {
            fx.set_band(i, *gain);
        }
        fx.eq_enabled = settings.equalizer;
        fx.set_level(Effect::BassBoost, settings.bass_boost);
        fx.set_level(Effect::Reverb, settings.reverb);
        fx.set_level(Effect::Surround, settings.surround);
        fx.set_volume(settings.volume);
        fx
    }

    pub fn is_eq_enabled(&self) -> bool {
        self.eq_enabled
    }

    /// Flip the equalizer; returns the new state.
    pub fn toggle_eq(&mut self) -> bool {
        self.eq_enabled = !self.eq_enabled;
        self.eq_enabled
    }

    pub fn bands(&self) -> &[f32; 10] {
        &self.bands
    }

    /// Set one band, clamped to +/-[`MAX_GAIN_DB`]. False for a bad index.
    pub fn set_band(&mut self, index: usize, gain_db: f32) -> bool {
        let Some(slot) = self.bands.get_mut(index) else {
            return false;
        };
        *slot = gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB);
        self.preset = None;
        true
    }

    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    /// Apply `preset` and switch the equalizer on.
    pub fn load_preset(&mut self, preset: Preset) {
        self.bands = [0.0; 10];
        self.bands[..8].copy_from_slice(&preset.gains());
        self.preset = Some(preset);
        self.eq_enabled = true;
    }

    /// Load the preset after the current one (hand-tuned bands go to flat).
    pub fn cycle_preset(&mut self) -> Preset {
        let next = self.preset.map_or(Preset::Flat, Preset::next);
        self.load_preset(next);
        next
    }

    fn slot(&mut self, effect: Effect) -> &mut Level {
        match effect {
            Effect::BassBoost => &mut self.bass,
            Effect::Reverb => &mut self.reverb,
            Effect::Surround => &mut self.surround,
        }
    }

    fn get(&self, effect: Effect) -> Level {
        match effect {
            Effect::BassBoost => self.bass,
            Effect::Reverb => self.reverb,
            Effect::Surround => self.surround,
        }
    }

    /// Flip `effect`; switching on from level 0 picks the effect's default.
    pub fn toggle(&mut self, effect: Effect) -> bool {
        let slot = self.slot(effect);
        slot.enabled = !slot.enabled;
        if slot.enabled && slot.level == 0 {
            slot.level = effect.default_level();
        }
        slot.enabled
    }

    /// Clamp to 0..=[`MAX_LEVEL`]; a non-zero level enables the effect.
    pub fn set_level(&mut self, effect: Effect, level: u8) {
        let slot = self.slot(effect);
        slot.level = level.min(MAX_LEVEL);
        if slot.level > 0 {
            slot.enabled = true;
        }
    }

    pub fn level(&self, effect: Effect) -> u8 {
        self.get(effect).level
    }

    pub fn is_enabled(&self, effect: Effect) -> bool {
        self.get(effect).enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Nudge the volume by `delta` and return the clamped result.
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.set_volume(self.volume + delta);
        self.volume
    }

    /// One-line summary for the status box.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.is_eq_enabled() {
            let name = self.preset().map_or("custom", Preset::label);
            parts.push(format!("EQ {name}"));
        }
        for effect in [Effect::BassBoost, Effect::Reverb, Effect::Surround] {
            let l = self.get(effect);
            if l.enabled {
                parts.push(format!("{} {}", effect.label(), l.level));
            }
        }
        parts.push(format!("Vol {}%", (self.volume() * 100.0).round() as u32));
        parts.join(", ")
    }

    /// Lines for the effects pane.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(BANDS.len() + 6);
        let state = if self.is_eq_enabled() { "on" } else { "off" };
        let name = self.preset().map_or("custom", Preset::label);
        lines.push(format!("Equalizer: {state} ({name})"));
        for (label, gain) in BANDS.iter().zip(self.bands().iter()) {
            lines.push(format!(
                "{:>5} {} {:+.0} dB",
                label,
                level_bar(*gain, MAX_GAIN_DB),
                gain
            ));
        }
        lines.push(String::new());
        for effect in [Effect::BassBoost, Effect::Reverb, Effect::Surround] {
            let state = if self.is_enabled(effect) { "on" } else { "off" };
            lines.push(format!(
                "{}: {} ({}/{})",
                effect.label(),
                state,
                self.level(effect),
                MAX_LEVEL
            ));
        }
        lines.push(format!(
            "Volume: {}%",
            (self.volume() * 100.0).round() as u32
        ));
        lines
    }
}

/// Centre-marked bar for a value in `-max..=max`: negative values fill to
/// the left of `|`, positive ones to the right.
pub fn level_bar(value: f32, max: f32) -> String {
    let ratio = if max > 0.0 {
        (value.abs() / max).min(1.0)
    } else {
        0.0
    };
    let filled = (ratio * BAR_HALF as f32).round() as usize;
    let empty = BAR_HALF - filled;

    let mut bar = String::with_capacity(BAR_HALF * 2 + 1);
    if value < 0.0 {
        bar.push_str(&" ".repeat(empty));
        bar.push_str(&"=".repeat(filled));
        bar.push('|');
        bar.push_str(&" ".repeat(BAR_HALF));
    } else {
        bar.push_str(&" ".repeat(BAR_HALF));
        bar.push('|');
        bar.push_str(&"=".repeat(filled));
        bar.push_str(&" ".repeat(empty));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_flat_with_full_volume() {
        let fx = Effects::new();
        assert!(!fx.is_eq_enabled());
        assert_eq!(fx.bands(), &[0.0; 10]);
        assert_eq!(fx.preset(), Some(Preset::Flat));
        assert_eq!(fx.volume(), 1.0);
        assert_eq!(fx.summary(), "Vol 100%");
    }

    #[test]
    fn preset_sets_low_bands_and_enables_eq() {
        let mut fx = Effects::new();
        fx.load_preset(Preset::Rock);
        assert!(fx.is_eq_enabled());
        assert_eq!(&fx.bands()[..3], &[5.0, 3.0, -2.0]);
        assert_eq!(&fx.bands()[8..], &[0.0, 0.0]);
        assert!(fx.summary().starts_with("EQ rock"));
    }

    #[test]
    fn cycling_presets_wraps_back_to_flat() {
        let mut fx = Effects::new();
        let seen: Vec<Preset> = (0..Preset::ALL.len()).map(|_| fx.cycle_preset()).collect();
        assert_eq!(seen[0], Preset::Rock);
        assert_eq!(seen.last(), Some(&Preset::Flat));
        assert_eq!(fx.bands(), &[0.0; 10]);
    }

    #[test]
    fn bands_are_clamped_and_mark_custom() {
        let mut fx = Effects::new();
        assert!(fx.set_band(0, 40.0));
        assert!(fx.set_band(9, -40.0));
        assert!(!fx.set_band(10, 1.0));
        assert_eq!(fx.bands()[0], MAX_GAIN_DB);
        assert_eq!(fx.bands()[9], -MAX_GAIN_DB);
        assert_eq!(fx.preset(), None);

        assert_eq!(fx.cycle_preset(), Preset::Flat);
    }

    #[test]
    fn toggling_from_zero_uses_default_level() {
        let mut fx = Effects::new();
        assert!(fx.toggle(Effect::BassBoost));
        assert_eq!(fx.level(Effect::BassBoost), 5);
        assert!(fx.toggle(Effect::Reverb));
        assert_eq!(fx.level(Effect::Reverb), 3);

        assert!(!fx.toggle(Effect::BassBoost));
        assert_eq!(fx.level(Effect::BassBoost), 5);
        assert!(!fx.is_enabled(Effect::BassBoost));
    }

    #[test]
    fn levels_clamp_and_enable() {
        let mut fx = Effects::new();
        fx.set_level(Effect::Surround, 42);
        assert_eq!(fx.level(Effect::Surround), MAX_LEVEL);
        assert!(fx.is_enabled(Effect::Surround));

        fx.set_level(Effect::Reverb, 0);
        assert!(!fx.is_enabled(Effect::Reverb));
    }

    #[test]
    fn volume_stays_in_range() {
        let mut fx = Effects::new();
        assert_eq!(fx.adjust_volume(0.5), 1.0);
        fx.set_volume(0.3);
        assert!((fx.adjust_volume(-0.1) - 0.2).abs() < 1e-6);
        assert_eq!(fx.adjust_volume(-5.0), 0.0);
    }

    #[test]
    fn from_settings_applies_preset_then_bands() {
        let settings = EffectsSettings {
            equalizer: false,
            preset: "Jazz".to_string(),
            bands: vec![1.0, -2.0],
            bass_boost: 7,
            reverb: 0,
            surround: 0,
            volume: 0.8,
        };
        let fx = Effects::from_settings(&settings);
        assert!(!fx.is_eq_enabled());
        assert_eq!(fx.preset(), None);
        assert_eq!(&fx.bands()[..3], &[1.0, -2.0, 1.0]);
        assert!(fx.is_enabled(Effect::BassBoost));
        assert_eq!(fx.level(Effect::BassBoost), 7);
        assert!(!fx.is_enabled(Effect::Reverb));
        assert_eq!(fx.summary(), "Bass boost 7, Vol 80%");
    }

    #[test]
    fn unknown_preset_name_falls_back_to_flat() {
        let settings = EffectsSettings {
            preset: "loudness".to_string(),
            ..EffectsSettings::default()
        };
        assert_eq!(Effects::from_settings(&settings).preset(), Some(Preset::Flat));
    }

    #[test]
    fn level_bar_fills_away_from_centre() {
        assert_eq!(level_bar(0.0, 12.0), format!("{}|{}", " ".repeat(12), " ".repeat(12)));
        assert_eq!(level_bar(6.0, 12.0), format!("{}|======{}", " ".repeat(12), " ".repeat(6)));
        assert_eq!(level_bar(-12.0, 12.0), format!("{}|{}", "=".repeat(12), " ".repeat(12)));
        assert_eq!(level_bar(99.0, 12.0).chars().filter(|c| *c == '=').count(), 12);
    }

    #[test]
    fn describe_lists_every_band() {
        let lines = Effects::new().describe();
        assert_eq!(lines[0], "Equalizer: off (flat)");
        for band in BANDS {
            assert!(lines.iter().any(|l| l.trim_start().starts_with(band)), "{band}");
        }
        assert_eq!(lines.last().map(String::as_str), Some("Volume: 100%"));
    }
}
