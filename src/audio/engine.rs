//! The playback state machine.
//!
//! All session state sits behind one mutex. Public commands and the
//! completion dispatcher take that lock for the whole transition, and every
//! transition tears the previous backend down before creating the next, so
//! at most one backend is ever live.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;

use crate::config::Settings;
use crate::library::{Playlist, Track};
use crate::stats::PlayRecorder;

use super::backend::{BackendOpener, PlaybackBackend, RodioOpener};
use super::history::{DEFAULT_HISTORY_CAPACITY, RecentHistory};
use super::notify::{BackendEvent, Notifier, Outcome};
use super::shuffle::ShuffleOrder;
use super::simulated::SimulatedBackend;
use super::types::{FormatClass, FormatTable, PlaybackState, PlaybackStatus};

/// Construction-time knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub formats: FormatTable,
    pub history_capacity: usize,
}

impl EngineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            formats: FormatTable::from_settings(&settings.audio),
            history_capacity: settings.playback.history_capacity,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            formats: FormatTable::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

struct LiveBackend {
    backend: Box<dyn PlaybackBackend>,
    generation: u64,
}

struct Session {
    playlist: Option<Arc<Playlist>>,
    index: usize,
    current: Option<Arc<Track>>,
    playing: bool,
    paused: bool,
    stopped: bool,
    shuffle: bool,
    repeat: bool,
    backend: Option<LiveBackend>,
    generation: u64,
    order: ShuffleOrder,
    history: RecentHistory,
}

impl Session {
    fn new(history_capacity: usize) -> Self {
        Self {
            playlist: None,
            index: 0,
            current: None,
            playing: false,
            paused: false,
            stopped: false,
            shuffle: false,
            repeat: false,
            backend: None,
            generation: 0,
            order: ShuffleOrder::default(),
            history: RecentHistory::new(history_capacity),
        }
    }

    fn state(&self) -> PlaybackState {
        if self.playlist.is_none() {
            PlaybackState::Idle
        } else if self.playing {
            PlaybackState::Playing
        } else if self.paused {
            PlaybackState::Paused
        } else if self.stopped {
            PlaybackState::Stopped
        } else {
            PlaybackState::Loaded
        }
    }

    fn playlist_len(&self) -> usize {
        self.playlist.as_ref().map_or(0, |p| p.len())
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Close the live backend, if any. Its completion can no longer match.
    fn teardown(&mut self) {
        if let Some(mut live) = self.backend.take() {
            tracing::debug!(
                backend = live.backend.kind().label(),
                generation = live.generation,
                "closing backend"
            );
            live.backend.close();
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    events: Sender<BackendEvent>,
    opener: Box<dyn BackendOpener>,
    recorder: Arc<dyn PlayRecorder>,
    formats: FormatTable,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Walk the fallback chain for `track`. Always yields a started backend:
    /// the simulated variant cannot fail to open.
    fn open_backend(&self, s: &mut Session, track: &Track) -> LiveBackend {
        let class = self.formats.classify(&track.path);

        if class != FormatClass::Unknown {
            let generation = s.next_generation();
            let notifier = Notifier::new(self.events.clone(), generation);
            match self.opener.open(class, track, notifier) {
                Ok(mut backend) => match backend.start() {
                    Ok(()) => return LiveBackend {
                        backend,
                        generation,
                    },
                    Err(e) => {
                        backend.close();
                        tracing::warn!(
                            path = %track.path.display(),
                            error = %e,
                            "backend failed to start, falling back to simulation"
                        );
                    }
                },
                Err(e) => tracing::warn!(
                    path = %track.path.display(),
                    class = ?class,
                    error = %e,
                    "backend failed to open, falling back to simulation"
                ),
            }
        } else {
            tracing::debug!(path = %track.path.display(), "no real backend for this format");
        }

        let generation = s.next_generation();
        let mut sim = SimulatedBackend::new(track, Notifier::new(self.events.clone(), generation));
        if let Err(e) = sim.start() {
            // Without a timer the track simply never auto-advances.
            tracing::error!(error = %e, "simulation timer could not start");
        }
        LiveBackend {
            backend: Box::new(sim),
            generation,
        }
    }

    /// Start the current track from zero on a new backend.
    fn start_current(&self, s: &mut Session) -> bool {
        let Some(track) = s.current.clone() else {
            return false;
        };

        s.teardown();
        let live = self.open_backend(s, &track);
        tracing::info!(
            title = %track.title,
            artist = %track.artist,
            backend = live.backend.kind().label(),
            "playing"
        );
        s.backend = Some(live);
        s.playing = true;
        s.paused = false;
        s.stopped = false;

        track.mark_played(Local::now());
        s.history.record(Arc::clone(&track));
        self.recorder.record_play(&track);
        true
    }

    /// Point the session at `index`; start it if something was playing.
    fn move_to(&self, s: &mut Session, index: usize) -> bool {
        s.index = index;
        s.current = s.playlist.as_ref().and_then(|p| p.get(index).cloned());
        if s.playing || s.paused {
            s.paused = false;
            return self.start_current(s);
        }
        true
    }

    fn step(&self, s: &mut Session, forward: bool) -> bool {
        let len = s.playlist_len();
        if len == 0 {
            return false;
        }

        s.teardown();
        let index = if s.shuffle {
            let slot = if forward {
                s.order.advance()
            } else {
                s.order.retreat()
            };
            slot.unwrap_or(0)
        } else if forward {
            (s.index + 1) % len
        } else {
            (s.index + len - 1) % len
        };
        self.move_to(s, index)
    }

    fn on_completed(&self, generation: u64, outcome: Outcome) {
        let mut s = self.lock();

        let is_live = s
            .backend
            .as_ref()
            .is_some_and(|l| l.generation == generation);
        if !is_live {
            tracing::trace!(generation, "ignoring completion from a released backend");
            return;
        }

        if let Outcome::Failed(e) = &outcome {
            tracing::warn!(error = %e, "playback failed mid-track");
        }

        s.teardown();
        if !s.playing || s.paused {
            // The backend has nothing left to resume; play() restarts the track.
            tracing::debug!(generation, "track ended while paused");
            return;
        }

        if s.repeat {
            self.start_current(&mut s);
        } else {
            self.step(&mut s, true);
        }
    }
}

fn dispatch(shared: Arc<Shared>, rx: Receiver<BackendEvent>) {
    while let Ok(event) = rx.recv() {
        match event {
            BackendEvent::Completed {
                generation,
                outcome,
            } => shared.on_completed(generation, outcome),
            BackendEvent::Shutdown => break,
        }
    }
}

/// The player's single playback state machine.
///
/// Safe to share across threads; every method takes the session lock.
pub struct PlaybackEngine {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackEngine {
    pub fn new(
        opener: Box<dyn BackendOpener>,
        recorder: Arc<dyn PlayRecorder>,
        options: EngineOptions,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<BackendEvent>();
        let shared = Arc::new(Shared {
            session: Mutex::new(Session::new(options.history_capacity)),
            events: tx,
            opener,
            recorder,
            formats: options.formats,
        });

        let for_thread = Arc::clone(&shared);
        let dispatcher = thread::Builder::new()
            .name("cadence-dispatch".to_string())
            .spawn(move || dispatch(for_thread, rx))
            .map_err(|e| tracing::error!(error = %e, "completion dispatcher did not start"))
            .ok();

        Self {
            shared,
            dispatcher: Mutex::new(dispatcher),
        }
    }

    /// Engine driving rodio on the default output device.
    pub fn with_settings(settings: &Settings, recorder: Arc<dyn PlayRecorder>) -> Self {
        let opener = RodioOpener::new(Duration::from_millis(settings.audio.poll_interval_ms));
        Self::new(
            Box::new(opener),
            recorder,
            EngineOptions::from_settings(settings),
        )
    }

    /// Replace the playlist and rewind to its first track without starting
    /// playback. Any live backend is released.
    pub fn load_playlist(&self, playlist: Option<Arc<Playlist>>) {
        let mut s = self.shared.lock();
        s.teardown();
        s.playing = false;
        s.paused = false;
        s.stopped = false;
        s.index = 0;
        s.current = playlist.as_ref().and_then(|p| p.get(0).cloned());
        s.playlist = playlist;
        let len = s.playlist_len();
        s.order.regenerate(len);
        s.order.locate(0);
        tracing::debug!(len, "playlist loaded");
    }

    /// Start or resume the current track. Returns `false` only when there is
    /// no current track.
    ///
    /// Resuming from pause is exact when the backend supports pause. When it
    /// does not (streamed formats), the track starts over from zero.
    pub fn play(&self) -> bool {
        let mut s = self.shared.lock();
        if s.current.is_none() {
            return false;
        }

        if s.paused {
            if let Some(live) = s.backend.as_mut() {
                if live.backend.capabilities().pause {
                    live.backend.resume();
                    s.paused = false;
                    s.playing = true;
                    tracing::debug!("resumed");
                    return true;
                }
            }
            tracing::debug!("backend cannot resume, restarting track");
        }

        self.shared.start_current(&mut s)
    }

    /// Pause if playing. Backends without pause support are released, and
    /// the reported position drops to zero.
    pub fn pause(&self) {
        let mut s = self.shared.lock();
        if !s.playing {
            return;
        }

        let keep = s
            .backend
            .as_ref()
            .is_some_and(|l| l.backend.capabilities().pause);
        if keep {
            if let Some(live) = s.backend.as_mut() {
                live.backend.pause();
            }
        } else {
            s.teardown();
        }
        s.playing = false;
        s.paused = true;
        tracing::debug!(kept_backend = keep, "paused");
    }

    pub fn stop(&self) {
        let mut s = self.shared.lock();
        s.teardown();
        s.playing = false;
        s.paused = false;
        s.stopped = true;
        tracing::debug!("stopped");
    }

    pub fn next(&self) -> bool {
        let mut s = self.shared.lock();
        self.shared.step(&mut s, true)
    }

    pub fn previous(&self) -> bool {
        let mut s = self.shared.lock();
        self.shared.step(&mut s, false)
    }

    /// Select the track at `index`, starting it if playback was active.
    pub fn jump_to(&self, index: usize) -> bool {
        let mut s = self.shared.lock();
        if index >= s.playlist_len() {
            return false;
        }
        s.teardown();
        s.order.locate(index);
        self.shared.move_to(&mut s, index)
    }

    /// Flip shuffle. Turning it on reshuffles the future order around the
    /// current track; the current track keeps playing.
    pub fn toggle_shuffle(&self) -> bool {
        let mut s = self.shared.lock();
        s.shuffle = !s.shuffle;
        if s.shuffle {
            let len = s.playlist_len();
            let index = s.index;
            s.order.regenerate(len);
            s.order.locate(index);
        }
        s.shuffle
    }

    pub fn toggle_repeat(&self) -> bool {
        let mut s = self.shared.lock();
        s.repeat = !s.repeat;
        s.repeat
    }

    pub fn status(&self) -> PlaybackStatus {
        let s = self.shared.lock();
        let (backend, elapsed) = match &s.backend {
            Some(live) => {
                let elapsed = if live.backend.capabilities().position {
                    live.backend.position()
                } else {
                    None
                };
                (Some(live.backend.kind()), elapsed)
            }
            None if s.paused => (None, Some(Duration::ZERO)),
            None => (None, None),
        };

        PlaybackStatus {
            state: s.state(),
            total: s.current.as_ref().map(|t| t.duration),
            track: s.current.clone(),
            index: s.index,
            shuffle: s.shuffle,
            repeat: s.repeat,
            backend,
            elapsed,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state()
    }

    pub fn current_track(&self) -> Option<Arc<Track>> {
        self.shared.lock().current.clone()
    }

    pub fn current_playlist(&self) -> Option<Arc<Playlist>> {
        self.shared.lock().playlist.clone()
    }

    pub fn current_index(&self) -> usize {
        self.shared.lock().index
    }

    pub fn recently_played(&self) -> Vec<Arc<Track>> {
        self.shared.lock().history.snapshot()
    }

    pub fn is_shuffle(&self) -> bool {
        self.shared.lock().shuffle
    }

    pub fn is_repeat(&self) -> bool {
        self.shared.lock().repeat
    }

    /// Release the backend and stop the dispatcher. Safe to call twice.
    pub fn cleanup(&self) {
        self.stop();
        let handle = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(h) = handle {
            let _ = self.shared.events.send(BackendEvent::Shutdown);
            let _ = h.join();
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.cleanup();
    }
}
