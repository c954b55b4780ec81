//! Frame-streaming backend for compressed formats.
//!
//! Decoding runs lazily from the open file while the worker thread renders
//! to the device. There is no pause and no position: pausing is handled by
//! the engine as stop-and-restart.

use std::time::Duration;

use crate::library::Track;

use super::backend::PlaybackBackend;
use super::error::BackendError;
use super::notify::Notifier;
use super::sink::{SinkWorker, SourceMode};
use super::types::{BackendKind, Capabilities};

pub struct StreamingBackend {
    worker: Option<SinkWorker>,
}

impl StreamingBackend {
    pub fn open(
        track: &Track,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Result<Self, BackendError> {
        let worker = SinkWorker::spawn(&track.path, SourceMode::Streaming, notifier, poll_interval)?;
        Ok(Self {
            worker: Some(worker),
        })
    }
}

impl PlaybackBackend for StreamingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Streaming
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    fn start(&mut self) -> Result<(), BackendError> {
        match self.worker.as_ref() {
            Some(w) => {
                w.sink().play();
                Ok(())
            }
            None => Err(BackendError::DeviceUnavailable(
                "stream already released".to_string(),
            )),
        }
    }

    fn close(&mut self) {
        if let Some(mut w) = self.worker.take() {
            w.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    fn open_path(path: &std::path::Path) -> Option<BackendError> {
        let (tx, _rx) = mpsc::channel();
        let track = Track::new("T", "A", "B", Duration::from_secs(1), path);
        StreamingBackend::open(&track, Notifier::new(tx, 1), Duration::from_millis(20)).err()
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp3");
        assert_eq!(open_path(&path), Some(BackendError::FileNotFound(path)));
    }

    #[test]
    fn garbage_payload_fails_decoder_init() {
        let mut file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .unwrap();
        file.write_all(b"definitely not audio, just text").unwrap();
        file.flush().unwrap();

        let err = open_path(file.path());
        assert!(
            matches!(err, Some(BackendError::DecodeInit(_))),
            "got {err:?}"
        );
    }
}
