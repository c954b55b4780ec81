//! Single-shot completion signal from a backend to the engine.
//!
//! Every backend instance receives one `Notifier`. Firing consumes it, so a
//! backend can report at most one outcome. All notifiers of an engine share
//! one channel; the engine drains it inside its own lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use super::error::BackendError;

/// How a backend's playback ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Natural end of media (or of the simulated duration).
    Finished,
    /// Playback broke after a successful start.
    Failed(BackendError),
}

#[derive(Debug)]
pub enum BackendEvent {
    Completed { generation: u64, outcome: Outcome },
    /// Stops the engine's dispatcher thread.
    Shutdown,
}

/// Handle a backend uses to report completion of its track.
#[derive(Debug)]
pub struct Notifier {
    tx: Sender<BackendEvent>,
    generation: u64,
    released: Arc<AtomicBool>,
}

impl Notifier {
    pub(crate) fn new(tx: Sender<BackendEvent>, generation: u64) -> Self {
        Self {
            tx,
            generation,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared flag the owning backend sets on close; a released notifier
    /// never sends.
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn finished(self) {
        self.send(Outcome::Finished);
    }

    pub fn failed(self, err: BackendError) {
        self.send(Outcome::Failed(err));
    }

    fn send(self, outcome: Outcome) {
        if self.is_released() {
            return;
        }
        // The engine may already be gone at process exit.
        let _ = self.tx.send(BackendEvent::Completed {
            generation: self.generation,
            outcome,
        });
    }
}
