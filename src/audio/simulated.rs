//! Time-based stand-in for tracks no real backend can play.
//!
//! Nothing is read from the file. A timer thread fires one completion after
//! the track's duration; pausing shifts the deadline by the paused span.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::library::Track;

use super::backend::PlaybackBackend;
use super::error::BackendError;
use super::notify::Notifier;
use super::types::{BackendKind, Capabilities};

#[derive(Debug, Default)]
struct Clock {
    started: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    closed: bool,
}

impl Clock {
    fn elapsed(&self, now: Instant) -> Duration {
        let Some(started) = self.started else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started)
            .saturating_sub(self.paused_total)
    }
}

/// Shortest simulated track. Keeps a zero-length entry on repeat from
/// spinning the dispatcher.
const MIN_DURATION: Duration = Duration::from_millis(250);

type Shared = Arc<(Mutex<Clock>, Condvar)>;

fn lock(shared: &Shared) -> MutexGuard<'_, Clock> {
    shared.0.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct SimulatedBackend {
    duration: Duration,
    clock: Shared,
    notifier: Option<Notifier>,
    released: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
}

impl SimulatedBackend {
    pub fn new(track: &Track, notifier: Notifier) -> Self {
        Self {
            duration: track.duration.max(MIN_DURATION),
            clock: Arc::new((Mutex::new(Clock::default()), Condvar::new())),
            released: notifier.release_flag(),
            notifier: Some(notifier),
            timer: None,
        }
    }
}

fn run_timer(clock: Shared, duration: Duration, notifier: Notifier) {
    let mut st = lock(&clock);
    loop {
        if st.closed {
            return;
        }
        if st.paused_at.is_some() {
            st = clock.1.wait(st).unwrap_or_else(|e| e.into_inner());
            continue;
        }
        let remaining = duration.saturating_sub(st.elapsed(Instant::now()));
        if remaining.is_zero() {
            break;
        }
        st = clock
            .1
            .wait_timeout(st, remaining)
            .map(|(g, _)| g)
            .unwrap_or_else(|e| e.into_inner().0);
    }
    drop(st);
    notifier.finished();
}

impl PlaybackBackend for SimulatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simulated
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn start(&mut self) -> Result<(), BackendError> {
        let Some(notifier) = self.notifier.take() else {
            return Err(BackendError::DeviceUnavailable(
                "simulation already started".to_string(),
            ));
        };

        lock(&self.clock).started = Some(Instant::now());

        let clock = Arc::clone(&self.clock);
        let duration = self.duration;
        let handle = thread::Builder::new()
            .name("cadence-simulated".to_string())
            .spawn(move || run_timer(clock, duration, notifier))
            .map_err(|e| BackendError::DeviceUnavailable(e.to_string()))?;
        self.timer = Some(handle);
        Ok(())
    }

    fn pause(&mut self) {
        let mut st = lock(&self.clock);
        if st.started.is_some() && st.paused_at.is_none() {
            st.paused_at = Some(Instant::now());
        }
        self.clock.1.notify_all();
    }

    fn resume(&mut self) {
        let mut st = lock(&self.clock);
        if let Some(at) = st.paused_at.take() {
            st.paused_total += at.elapsed();
        }
        self.clock.1.notify_all();
    }

    fn position(&self) -> Option<Duration> {
        Some(lock(&self.clock).elapsed(Instant::now()).min(self.duration))
    }

    fn close(&mut self) {
        self.released.store(true, Ordering::SeqCst);
        lock(&self.clock).closed = true;
        self.clock.1.notify_all();
        if let Some(h) = self.timer.take() {
            let _ = h.join();
        }
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::notify::{BackendEvent, Outcome};
    use std::sync::mpsc;

    fn track(ms: u64) -> Track {
        Track::new("Sim", "Artist", "Album", Duration::from_millis(ms), "/x.none")
    }

    #[test]
    fn fires_exactly_once_after_duration() {
        let (tx, rx) = mpsc::channel();
        let mut b = SimulatedBackend::new(&track(60), Notifier::new(tx, 3));
        b.start().unwrap();

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            BackendEvent::Completed {
                generation,
                outcome,
            } => {
                assert_eq!(generation, 3);
                assert_eq!(outcome, Outcome::Finished);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        b.close();
    }

    #[test]
    fn close_before_deadline_suppresses_completion() {
        let (tx, rx) = mpsc::channel();
        let mut b = SimulatedBackend::new(&track(150), Notifier::new(tx, 1));
        b.start().unwrap();
        b.close();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn pause_freezes_position_and_delays_completion() {
        let (tx, rx) = mpsc::channel();
        let mut b = SimulatedBackend::new(&track(200), Notifier::new(tx, 1));
        b.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        b.pause();
        let at_pause = b.position().unwrap();

        thread::sleep(Duration::from_millis(250));
        assert_eq!(b.position().unwrap(), at_pause);
        assert!(rx.try_recv().is_err(), "completed while paused");

        b.resume();
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        b.close();
    }

    #[test]
    fn zero_length_track_still_takes_a_moment() {
        let (tx, rx) = mpsc::channel();
        let mut b = SimulatedBackend::new(&track(0), Notifier::new(tx, 1));
        b.start().unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        b.close();
    }

    #[test]
    fn declares_pause_and_position() {
        let (tx, _rx) = mpsc::channel();
        let b = SimulatedBackend::new(&track(10), Notifier::new(tx, 1));
        assert_eq!(b.capabilities(), Capabilities::FULL);
        assert_eq!(b.position(), Some(Duration::ZERO));
    }
}
