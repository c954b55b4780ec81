//! Buffered clip backend for uncompressed/container formats.
//!
//! The file is read fully into memory before `open` returns; the sink then
//! supports exact pause/resume and position queries.

use std::time::Duration;

use crate::library::Track;

use super::backend::PlaybackBackend;
use super::error::BackendError;
use super::notify::Notifier;
use super::sink::{SinkWorker, SourceMode};
use super::types::{BackendKind, Capabilities};

pub struct BufferedClipBackend {
    worker: Option<SinkWorker>,
}

impl BufferedClipBackend {
    pub fn open(
        track: &Track,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Result<Self, BackendError> {
        let worker = SinkWorker::spawn(&track.path, SourceMode::Buffered, notifier, poll_interval)?;
        Ok(Self {
            worker: Some(worker),
        })
    }
}

impl PlaybackBackend for BufferedClipBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::BufferedClip
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn start(&mut self) -> Result<(), BackendError> {
        match self.worker.as_ref() {
            Some(w) => {
                w.sink().play();
                Ok(())
            }
            None => Err(BackendError::DeviceUnavailable(
                "clip already released".to_string(),
            )),
        }
    }

    fn pause(&mut self) {
        if let Some(w) = self.worker.as_ref() {
            w.sink().pause();
        }
    }

    fn resume(&mut self) {
        if let Some(w) = self.worker.as_ref() {
            w.sink().play();
        }
    }

    fn position(&self) -> Option<Duration> {
        self.worker.as_ref().map(|w| w.sink().get_pos())
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
        BufferedClipBackend::open(&track, Notifier::new(tx, 1), Duration::from_millis(20)).err()
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.wav");
        assert_eq!(open_path(&path), Some(BackendError::FileNotFound(path)));
    }

    #[test]
    fn garbage_payload_fails_decoder_init() {
        let mut file = tempfile::Builder::new()
            .suffix(".wav")
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
