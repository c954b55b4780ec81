use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Pane};
use crate::audio::PlaybackEngine;
use crate::effects::Effects;
use crate::library::scan;
use crate::logging;
use crate::stats::{NoopRecorder, PlayRecorder, PlayStats};

mod context;
mod event_loop;
mod settings;
mod startup;

pub fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings();

    // Logging is best effort; the player works without it.
    let _log_guard = match logging::init(&settings.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("cadence: logging disabled: {e:#}");
            None
        }
    };

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let library = scan(Path::new(&dir), &settings.library);

    let stats = Arc::new(PlayStats::new());
    let recorder: Arc<dyn PlayRecorder> = if settings.playback.record_stats {
        Arc::clone(&stats) as Arc<dyn PlayRecorder>
    } else {
        Arc::new(NoopRecorder)
    };
    let engine = Arc::new(PlaybackEngine::with_settings(&settings, recorder));

    let empty = library.is_empty();
    let mut ctx = context::Context::new(
        engine,
        library,
        Arc::clone(&stats),
        Effects::from_settings(&settings.effects),
    );
    ctx.recording = settings.playback.record_stats;
    ctx.timer
        .set_fade_out(Duration::from_secs(settings.sleep.fade_out_seconds));

    let mut app = App::new(0);
    ctx.show(&mut app, ctx.playlists.all_songs());
    startup::apply_playback_defaults(&ctx.engine, &settings);
    if settings.ui.show_recent {
        app.pane = Pane::Recent;
    }
    app.set_current_dir(dir);
    if empty {
        app.set_message("No audio files found");
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut ctx, &mut state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    ctx.timer.cancel();
    ctx.engine.cleanup();
    tracing::info!(
        plays = stats.session_plays(),
        listened_secs = stats.total_listened().as_secs(),
        "session ended"
    );

    run_result
}
