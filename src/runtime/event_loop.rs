use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Pane, Prompt};
use crate::audio::PlaybackState;
use crate::config;
use crate::effects::Effect;
use crate::playlists::FAVORITES;
use crate::sleep::SleepAction;
use crate::ui;

use super::context::Context;

const SLEEP_EXTEND: Duration = Duration::from_secs(5 * 60);
const VOLUME_STEP: f32 = 0.1;

/// What a key press asks for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Down,
    Up,
    Top,
    Bottom,
    PlaySelected,
    PlayPause,
    Stop,
    Next,
    Prev,
    Shuffle,
    Repeat,
    SleepToggle,
    SleepExtend,
    ToggleRecent,
    NextPlaylist,
    PrevPlaylist,
    Search,
    NewPlaylist,
    AddToTarget,
    AddToFavorites,
    RemoveSelected,
    DeletePlaylist,
    SmartPlaylist,
    ToggleStats,
    ResetStats,
    ToggleEffects,
    CyclePreset,
    ToggleEq,
    ToggleEffect(Effect),
    VolumeDown,
    VolumeUp,
    Quit,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Playing index seen on the previous iteration.
    pub last_index: Option<usize>,
}

/// Map a key press to an action. Any key other than `g` cancels a pending
/// `gg` prefix.
pub fn action_for(key: KeyEvent, state: &mut EventLoopState) -> Option<Action> {
    if key.code == KeyCode::Char('g') {
        if state.pending_gg {
            state.pending_gg = false;
            return Some(Action::Top);
        }
        state.pending_gg = true;
        return None;
    }
    state.pending_gg = false;

    let action = match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::Down,
        KeyCode::Char('k') | KeyCode::Up => Action::Up,
        KeyCode::Char('G') => Action::Bottom,
        KeyCode::Enter => Action::PlaySelected,
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::PlayPause,
        KeyCode::Char('x') => Action::Stop,
        KeyCode::Char('l') => Action::Next,
        KeyCode::Char('h') => Action::Prev,
        KeyCode::Char('s') => Action::Shuffle,
        KeyCode::Char('r') => Action::Repeat,
        KeyCode::Char('t') => Action::SleepToggle,
        KeyCode::Char('+') => Action::SleepExtend,
        KeyCode::Char('R') => Action::ToggleRecent,
        KeyCode::Char(']') => Action::NextPlaylist,
        KeyCode::Char('[') => Action::PrevPlaylist,
        KeyCode::Char('/') => Action::Search,
        KeyCode::Char('n') => Action::NewPlaylist,
        KeyCode::Char('a') => Action::AddToTarget,
        KeyCode::Char('f') => Action::AddToFavorites,
        KeyCode::Char('d') => Action::RemoveSelected,
        KeyCode::Char('D') => Action::DeletePlaylist,
        KeyCode::Char('m') => Action::SmartPlaylist,
        KeyCode::Char('i') => Action::ToggleStats,
        KeyCode::Char('X') => Action::ResetStats,
        KeyCode::Char('F') => Action::ToggleEffects,
        KeyCode::Char('e') => Action::CyclePreset,
        KeyCode::Char('E') => Action::ToggleEq,
        KeyCode::Char('b') => Action::ToggleEffect(Effect::BassBoost),
        KeyCode::Char('w') => Action::ToggleEffect(Effect::Reverb),
        KeyCode::Char('u') => Action::ToggleEffect(Effect::Surround),
        KeyCode::Char('<') => Action::VolumeDown,
        KeyCode::Char('>') => Action::VolumeUp,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Feed a key to the open prompt. Enter runs the prompt's command.
fn handle_prompt_key(key: KeyEvent, app: &mut App, ctx: &mut Context) {
    match key.code {
        KeyCode::Esc => app.cancel_prompt(),
        KeyCode::Backspace => app.pop_input(),
        KeyCode::Enter => match app.submit_prompt() {
            Some((Prompt::Search, query)) => ctx.search(app, &query),
            Some((Prompt::NewPlaylist, name)) => ctx.create_playlist(app, &name),
            None => {}
        },
        KeyCode::Char(c) if !c.is_control() => app.push_input(c),
        _ => {}
    }
}

/// Apply `action`. Returns true when the loop should exit.
fn apply(action: Action, settings: &config::Settings, app: &mut App, ctx: &mut Context) -> bool {
    let engine = &ctx.engine;
    match action {
        Action::Down => {
            app.follow_playback_off();
            app.next();
        }
        Action::Up => {
            app.follow_playback_off();
            app.prev();
        }
        Action::Top => {
            app.follow_playback_off();
            app.first();
        }
        Action::Bottom => {
            app.follow_playback_off();
            app.last();
        }
        Action::PlaySelected => {
            if app.has_tracks() {
                app.follow_playback_on();
                let resume = app.selected == engine.current_index()
                    && engine.state() == PlaybackState::Paused;
                if resume {
                    engine.play();
                } else if engine.jump_to(app.selected) && engine.state() != PlaybackState::Playing {
                    // jump_to already starts the track when something is playing.
                    engine.play();
                }
            }
        }
        Action::PlayPause => {
            app.follow_playback_on();
            if engine.state() == PlaybackState::Playing {
                engine.pause();
            } else if !engine.play() {
                app.set_message("Nothing to play");
            }
        }
        Action::Stop => engine.stop(),
        Action::Next => {
            app.follow_playback_on();
            engine.next();
        }
        Action::Prev => {
            app.follow_playback_on();
            engine.previous();
        }
        Action::Shuffle => {
            let on = engine.toggle_shuffle();
            app.set_message(format!("Shuffle {}", on_off(on)));
        }
        Action::Repeat => {
            let on = engine.toggle_repeat();
            app.set_message(format!("Repeat {}", on_off(on)));
        }
        Action::SleepToggle => {
            let timer = &ctx.timer;
            if timer.is_active() {
                timer.cancel();
                app.set_message("Sleep timer cancelled");
            } else {
                let action = SleepAction::from(settings.sleep.action);
                let minutes = settings.sleep.default_minutes;
                timer.set(Duration::from_secs(minutes * 60), action);
                let detail = match action {
                    SleepAction::FadeOut => {
                        format!("{} over {}s", action.label(), timer.fade_out().as_secs())
                    }
                    _ => action.label().to_string(),
                };
                app.set_message(format!("Sleep in {minutes} min ({detail})"));
            }
        }
        Action::SleepExtend => {
            if ctx.timer.extend(SLEEP_EXTEND) {
                app.set_message("Sleep timer +5 min");
            } else {
                app.set_message("No sleep timer running");
            }
        }
        Action::ToggleRecent => app.toggle_pane(Pane::Recent),
        Action::NextPlaylist => ctx.cycle_playlist(app, true),
        Action::PrevPlaylist => ctx.cycle_playlist(app, false),
        Action::Search => app.enter_prompt(Prompt::Search),
        Action::NewPlaylist => app.enter_prompt(Prompt::NewPlaylist),
        Action::AddToTarget => {
            let target = ctx.target.clone();
            ctx.add_selected(app, &target);
        }
        Action::AddToFavorites => ctx.add_selected(app, FAVORITES),
        Action::RemoveSelected => ctx.remove_selected(app),
        Action::DeletePlaylist => ctx.delete_current(app),
        Action::SmartPlaylist => ctx.next_smart(app, settings.smart.max_songs),
        Action::ToggleStats => app.toggle_pane(Pane::Stats),
        Action::ResetStats => ctx.reset_stats(app),
        Action::ToggleEffects => app.toggle_pane(Pane::Effects),
        Action::CyclePreset => {
            let preset = ctx.effects.cycle_preset();
            app.set_message(format!("Equalizer preset: {}", preset.label()));
        }
        Action::ToggleEq => {
            let on = ctx.effects.toggle_eq();
            app.set_message(format!("Equalizer {}", on_off(on)));
        }
        Action::ToggleEffect(effect) => {
            let on = ctx.effects.toggle(effect);
            app.set_message(format!("{} {}", effect.label(), on_off(on)));
        }
        Action::VolumeDown | Action::VolumeUp => {
            let delta = if action == Action::VolumeUp {
                VOLUME_STEP
            } else {
                -VOLUME_STEP
            };
            let v = ctx.effects.adjust_volume(delta);
            app.set_message(format!("Volume {}%", (v * 100.0).round() as u32));
        }
        Action::Quit => return true,
    }
    false
}

/// Route a key press: the open prompt takes it first, otherwise it maps to
/// an action. Returns true when the loop should exit.
fn handle_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    ctx: &mut Context,
    state: &mut EventLoopState,
) -> bool {
    if app.prompt().is_some() {
        state.pending_gg = false;
        handle_prompt_key(key, app, ctx);
        return false;
    }
    match action_for(key, state) {
        Some(action) => {
            tracing::trace!(?action, "key");
            apply(action, settings, app, ctx)
        }
        None => false,
    }
}

/// Main terminal event loop: draws the screen from the engine's status and
/// handles input. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    ctx: &mut Context,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        let status = ctx.engine.status();

        // Follow auto-advance and remote changes of the playing track.
        let playing = status.track.as_ref().map(|_| status.index);
        if playing != state.last_index {
            if let Some(i) = playing {
                app.follow(i);
            }
            state.last_index = playing;
        }
        if app.message_expired(Instant::now()) {
            app.clear_message();
        }

        let screen = ui::Screen {
            status,
            playlist: ctx.engine.current_playlist(),
            side: ctx.side_pane(app),
            sleep: ctx
                .timer
                .remaining()
                .map(|rem| (rem, ctx.timer.action())),
            target: ctx.target.clone(),
            effects: ctx.effects.summary(),
        };
        terminal.draw(|f| ui::draw(f, app, &screen, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(key, settings, app, ctx, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlaybackEngine;
    use crate::effects::Effects;
    use crate::library::Track;
    use crate::stats::{NoopRecorder, PlayStats};
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn context() -> (Context, App) {
        let engine = Arc::new(PlaybackEngine::with_settings(
            &config::Settings::default(),
            Arc::new(NoopRecorder),
        ));
        let library = ["Morning", "Noon", "Night"]
            .iter()
            .map(|t| {
                Arc::new(Track::new(
                    *t,
                    "Band",
                    "Day",
                    Duration::from_secs(60),
                    format!("/m/{t}.xyz"),
                ))
            })
            .collect();
        let ctx = Context::new(engine, library, Arc::new(PlayStats::new()), Effects::new());
        let mut app = App::new(0);
        ctx.show(&mut app, ctx.playlists.all_songs());
        (ctx, app)
    }

    fn type_keys(
        text: &str,
        settings: &config::Settings,
        app: &mut App,
        ctx: &mut Context,
        st: &mut EventLoopState,
    ) {
        for c in text.chars() {
            assert!(!handle_key(press(KeyCode::Char(c)), settings, app, ctx, st));
        }
    }

    #[test]
    fn maps_playback_keys() {
        let mut st = EventLoopState::default();
        let cases = [
            (KeyCode::Char(' '), Action::PlayPause),
            (KeyCode::Char('p'), Action::PlayPause),
            (KeyCode::Char('x'), Action::Stop),
            (KeyCode::Char('l'), Action::Next),
            (KeyCode::Char('h'), Action::Prev),
            (KeyCode::Char('s'), Action::Shuffle),
            (KeyCode::Char('r'), Action::Repeat),
            (KeyCode::Char('R'), Action::ToggleRecent),
            (KeyCode::Char('t'), Action::SleepToggle),
            (KeyCode::Char('+'), Action::SleepExtend),
            (KeyCode::Enter, Action::PlaySelected),
            (KeyCode::Down, Action::Down),
            (KeyCode::Char('k'), Action::Up),
            (KeyCode::Char('q'), Action::Quit),
        ];
        for (code, want) in cases {
            assert_eq!(action_for(press(code), &mut st), Some(want), "{code:?}");
        }
        assert_eq!(action_for(press(KeyCode::Char('z')), &mut st), None);
    }

    #[test]
    fn maps_library_and_effects_keys() {
        let mut st = EventLoopState::default();
        let cases = [
            (KeyCode::Char(']'), Action::NextPlaylist),
            (KeyCode::Char('['), Action::PrevPlaylist),
            (KeyCode::Char('/'), Action::Search),
            (KeyCode::Char('n'), Action::NewPlaylist),
            (KeyCode::Char('a'), Action::AddToTarget),
            (KeyCode::Char('f'), Action::AddToFavorites),
            (KeyCode::Char('d'), Action::RemoveSelected),
            (KeyCode::Char('D'), Action::DeletePlaylist),
            (KeyCode::Char('m'), Action::SmartPlaylist),
            (KeyCode::Char('i'), Action::ToggleStats),
            (KeyCode::Char('X'), Action::ResetStats),
            (KeyCode::Char('F'), Action::ToggleEffects),
            (KeyCode::Char('e'), Action::CyclePreset),
            (KeyCode::Char('E'), Action::ToggleEq),
            (KeyCode::Char('b'), Action::ToggleEffect(Effect::BassBoost)),
            (KeyCode::Char('w'), Action::ToggleEffect(Effect::Reverb)),
            (KeyCode::Char('u'), Action::ToggleEffect(Effect::Surround)),
            (KeyCode::Char('<'), Action::VolumeDown),
            (KeyCode::Char('>'), Action::VolumeUp),
        ];
        for (code, want) in cases {
            assert_eq!(action_for(press(code), &mut st), Some(want), "{code:?}");
        }
    }

    #[test]
    fn gg_needs_two_presses_in_a_row() {
        let mut st = EventLoopState::default();
        assert_eq!(action_for(press(KeyCode::Char('g')), &mut st), None);
        assert_eq!(action_for(press(KeyCode::Char('g')), &mut st), Some(Action::Top));

        assert_eq!(action_for(press(KeyCode::Char('g')), &mut st), None);
        assert_eq!(action_for(press(KeyCode::Char('j')), &mut st), Some(Action::Down));
        assert_eq!(action_for(press(KeyCode::Char('g')), &mut st), None);
        assert!(st.pending_gg);

        assert_eq!(action_for(press(KeyCode::Char('G')), &mut st), Some(Action::Bottom));
        assert!(!st.pending_gg);
    }

    #[test]
    fn prompt_swallows_keys_until_enter() {
        let settings = config::Settings::default();
        let (mut ctx, mut app) = context();
        let mut st = EventLoopState::default();

        type_keys("/", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.prompt(), Some(Prompt::Search));
        // `q` and `i` are text here, not quit and stats.
        type_keys("qi", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.input(), "qi");
        assert_eq!(app.pane, Pane::None);
        handle_key(press(KeyCode::Backspace), &settings, &mut app, &mut ctx, &mut st);
        handle_key(press(KeyCode::Backspace), &settings, &mut app, &mut ctx, &mut st);
        type_keys("noo", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.input(), "noo");

        handle_key(press(KeyCode::Enter), &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.prompt(), None);
        assert_eq!(app.playlist_name, "Search: noo");
        assert_eq!(app.len(), 1);
        assert_eq!(app.message(), Some("1 matches for \"noo\""));
    }

    #[test]
    fn escape_cancels_new_playlist_prompt() {
        let settings = config::Settings::default();
        let (mut ctx, mut app) = context();
        let mut st = EventLoopState::default();

        type_keys("nMix", &settings, &mut app, &mut ctx, &mut st);
        handle_key(press(KeyCode::Esc), &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.prompt(), None);
        assert_eq!(ctx.playlists.len(), 2);

        type_keys("nMix", &settings, &mut app, &mut ctx, &mut st);
        handle_key(press(KeyCode::Enter), &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(ctx.playlists.len(), 3);
        assert_eq!(ctx.target, "Mix");

        // `a` adds the selected track to the new playlist.
        type_keys("ja", &settings, &mut app, &mut ctx, &mut st);
        let mix = ctx.playlists.get("Mix").unwrap();
        assert_eq!(mix.tracks()[0].title, "Noon");
    }

    #[test]
    fn effect_keys_update_the_store() {
        let settings = config::Settings::default();
        let (mut ctx, mut app) = context();
        let mut st = EventLoopState::default();

        type_keys("eb<<", &settings, &mut app, &mut ctx, &mut st);
        assert!(ctx.effects.is_eq_enabled());
        assert!(ctx.effects.is_enabled(Effect::BassBoost));
        assert!((ctx.effects.volume() - 0.8).abs() < 1e-6);
        assert_eq!(app.message(), Some("Volume 80%"));

        type_keys("F", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.pane, Pane::Effects);
        type_keys("i", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(app.pane, Pane::Stats);
    }

    #[test]
    fn enter_on_paused_track_resumes_it() {
        let settings = config::Settings::default();
        let (mut ctx, mut app) = context();
        let mut st = EventLoopState::default();

        type_keys("j", &settings, &mut app, &mut ctx, &mut st);
        handle_key(press(KeyCode::Enter), &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(ctx.engine.state(), PlaybackState::Playing);
        assert_eq!(ctx.engine.current_index(), 1);

        type_keys("p", &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(ctx.engine.state(), PlaybackState::Paused);
        handle_key(press(KeyCode::Enter), &settings, &mut app, &mut ctx, &mut st);
        assert_eq!(ctx.engine.state(), PlaybackState::Playing);
        assert_eq!(ctx.engine.recently_played().len(), 1);
        ctx.engine.cleanup();
    }

    #[test]
    fn quit_key_ends_the_loop() {
        let settings = config::Settings::default();
        let (mut ctx, mut app) = context();
        let mut st = EventLoopState::default();
        assert!(handle_key(press(KeyCode::Char('q')), &settings, &mut app, &mut ctx, &mut st));
    }
}
