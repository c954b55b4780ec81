//! The backend contract shared by every audio-delivery mechanism.

use std::time::Duration;

use crate::library::Track;

use super::buffered::BufferedClipBackend;
use super::error::BackendError;
use super::notify::Notifier;
use super::streaming::StreamingBackend;
use super::types::{BackendKind, Capabilities, FormatClass};

/// One track's playback resource and its completion signal.
///
/// A backend reports completion through the `Notifier` it was built with,
/// at most once, and never after `close()` has been called. Callers branch
/// on `capabilities()` only.
pub trait PlaybackBackend: Send {
    fn kind(&self) -> BackendKind;

    fn capabilities(&self) -> Capabilities;

    /// Begin audible playback. On error the backend has already released
    /// everything it acquired.
    fn start(&mut self) -> Result<(), BackendError>;

    /// Only meaningful when `capabilities().pause` is set.
    fn pause(&mut self) {}

    /// Only meaningful when `capabilities().pause` is set.
    fn resume(&mut self) {}

    /// `None` unless `capabilities().position` is set.
    fn position(&self) -> Option<Duration> {
        None
    }

    /// Tear down and suppress any pending completion. Idempotent.
    fn close(&mut self);
}

/// Builds the real (device-backed) backends for a format class.
///
/// The simulated fallback is not an opener's business; the engine owns it.
pub trait BackendOpener: Send + Sync {
    fn open(
        &self,
        class: FormatClass,
        track: &Track,
        notifier: Notifier,
    ) -> Result<Box<dyn PlaybackBackend>, BackendError>;
}

/// Opens rodio-driven backends on the default output device.
#[derive(Debug, Clone)]
pub struct RodioOpener {
    poll_interval: Duration,
}

impl RodioOpener {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for RodioOpener {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

impl BackendOpener for RodioOpener {
    fn open(
        &self,
        class: FormatClass,
        track: &Track,
        notifier: Notifier,
    ) -> Result<Box<dyn PlaybackBackend>, BackendError> {
        match class {
            FormatClass::Streaming => Ok(Box::new(StreamingBackend::open(
                track,
                notifier,
                self.poll_interval,
            )?)),
            FormatClass::Buffered => Ok(Box::new(BufferedClipBackend::open(
                track,
                notifier,
                self.poll_interval,
            )?)),
            FormatClass::Unknown => Err(BackendError::UnsupportedFormat(
                track
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("<none>")
                    .to_string(),
            )),
        }
    }
}
