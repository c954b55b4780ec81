//! Sleep timer: pause or stop playback after a delay.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::PlaybackEngine;
use crate::config::SleepActionSetting;

const FADE_STEP: Duration = Duration::from_millis(500);
const MIN_FADE: Duration = Duration::from_secs(1);
const MAX_FADE: Duration = Duration::from_secs(60);

/// What the sleep timer drives when it fires.
pub trait SleepTarget: Send + Sync + 'static {
    fn pause(&self);
    fn stop(&self);
}

impl SleepTarget for PlaybackEngine {
    fn pause(&self) {
        PlaybackEngine::pause(self);
    }

    fn stop(&self) {
        PlaybackEngine::stop(self);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SleepAction {
    Stop,
    Pause,
    /// Counts the nominal volume down over the fade duration, then stops.
    FadeOut,
}

impl SleepAction {
    pub fn label(self) -> &'static str {
        match self {
            SleepAction::Stop => "stop",
            SleepAction::Pause => "pause",
            SleepAction::FadeOut => "fade out",
        }
    }
}

impl From<SleepActionSetting> for SleepAction {
    fn from(s: SleepActionSetting) -> Self {
        match s {
            SleepActionSetting::Stop => SleepAction::Stop,
            SleepActionSetting::Pause => SleepAction::Pause,
            SleepActionSetting::FadeOut => SleepAction::FadeOut,
        }
    }
}

#[derive(Debug)]
struct TimerState {
    generation: u64,
    deadline: Option<Instant>,
    action: SleepAction,
    fade: Duration,
}

type Shared = Arc<(Mutex<TimerState>, Condvar)>;

fn lock(shared: &Shared) -> MutexGuard<'_, TimerState> {
    shared.0.lock().unwrap_or_else(|e| e.into_inner())
}

/// Wait on the condvar until `until`, or until the timer is re-armed or
/// cancelled. Returns false if the generation changed.
fn wait_until<'a>(
    shared: &'a Shared,
    mut st: MutexGuard<'a, TimerState>,
    generation: u64,
    until: impl Fn(&TimerState) -> Option<Instant>,
) -> (MutexGuard<'a, TimerState>, bool) {
    loop {
        if st.generation != generation {
            return (st, false);
        }
        let Some(at) = until(&st) else {
            return (st, false);
        };
        let now = Instant::now();
        if now >= at {
            return (st, true);
        }
        st = match shared.1.wait_timeout(st, at - now) {
            Ok((guard, _)) => guard,
            Err(e) => e.into_inner().0,
        };
    }
}

/// One-shot countdown that acts on a [`SleepTarget`].
///
/// Each arming spawns a short-lived thread; re-arming or cancelling bumps a
/// generation counter so older threads exit without acting.
pub struct SleepTimer<T: SleepTarget> {
    target: Arc<T>,
    shared: Shared,
}

impl<T: SleepTarget> SleepTimer<T> {
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            shared: Arc::new((
                Mutex::new(TimerState {
                    generation: 0,
                    deadline: None,
                    action: SleepAction::Stop,
                    fade: Duration::from_secs(10),
                }),
                Condvar::new(),
            )),
        }
    }

    /// Arm the timer, replacing any countdown already running.
    pub fn set(&self, after: Duration, action: SleepAction) {
        let generation = {
            let mut st = lock(&self.shared);
            st.generation += 1;
            st.deadline = Some(Instant::now() + after);
            st.action = action;
            st.generation
        };
        self.shared.1.notify_all();
        tracing::info!(
            minutes = after.as_secs() / 60,
            action = action.label(),
            "sleep timer armed"
        );

        let shared = Arc::clone(&self.shared);
        let target = Arc::clone(&self.target);
        let spawned = thread::Builder::new()
            .name("cadence-sleep".to_string())
            .spawn(move || run(shared, target, generation));
        if let Err(e) = spawned {
            tracing::error!(error = %e, "sleep timer thread did not start");
            self.cancel();
        }
    }

    pub fn cancel(&self) {
        {
            let mut st = lock(&self.shared);
            st.generation += 1;
            st.deadline = None;
        }
        self.shared.1.notify_all();
    }

    /// Push the deadline back. False when no countdown is running.
    pub fn extend(&self, extra: Duration) -> bool {
        let mut st = lock(&self.shared);
        match st.deadline.as_mut() {
            Some(d) => {
                *d += extra;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        lock(&self.shared)
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_active(&self) -> bool {
        lock(&self.shared).deadline.is_some()
    }

    pub fn action(&self) -> SleepAction {
        lock(&self.shared).action
    }

    /// Fade length for [`SleepAction::FadeOut`], clamped to 1..=60 seconds.
    pub fn set_fade_out(&self, fade: Duration) {
        lock(&self.shared).fade = fade.clamp(MIN_FADE, MAX_FADE);
    }

    pub fn fade_out(&self) -> Duration {
        lock(&self.shared).fade
    }
}

impl<T: SleepTarget> Drop for SleepTimer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run<T: SleepTarget>(shared: Shared, target: Arc<T>, generation: u64) {
    let st = lock(&shared);
    let (mut st, due) = wait_until(&shared, st, generation, |s| s.deadline);
    if !due {
        return;
    }
    st.deadline = None;
    let action = st.action;
    let fade = st.fade;
    drop(st);

    tracing::info!(action = action.label(), "sleep timer fired");
    match action {
        SleepAction::Stop => target.stop(),
        SleepAction::Pause => target.pause(),
        SleepAction::FadeOut => fade_out(&shared, target.as_ref(), generation, fade),
    }
}

fn fade_out<T: SleepTarget>(shared: &Shared, target: &T, generation: u64, fade: Duration) {
    let steps = (fade.as_millis() / FADE_STEP.as_millis()).max(1) as u32;
    let step = fade / steps;
    let mut at = Instant::now();
    for i in 1..=steps {
        at += step;
        let st = lock(shared);
        let (_st, due) = wait_until(shared, st, generation, |_| Some(at));
        if !due {
            tracing::debug!("fade-out cancelled");
            return;
        }
        tracing::debug!(volume = 100 - i * 100 / steps, "fading");
    }
    target.stop();
}
