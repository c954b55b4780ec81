//! rodio sink ownership shared by the streaming and buffered backends.
//!
//! rodio's `OutputStream` must stay on the thread that opened it, so each
//! device-backed backend gets a worker thread that opens the device, owns
//! the stream for the life of the track, and watches for end of media.
//! The `Sink` itself is shared back to the engine side for play/pause.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::source::Buffered;
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};

use super::error::BackendError;
use super::notify::Notifier;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum SourceMode {
    /// Decode lazily from the file as the mixer pulls samples.
    Streaming,
    /// Read the whole file up front and replay from memory.
    Buffered,
}

enum Loaded {
    Stream(Decoder<BufReader<File>>),
    Clip(Buffered<Decoder<Cursor<Vec<u8>>>>),
}

enum Control {
    Close,
}

pub(super) struct SinkWorker {
    sink: Arc<Sink>,
    ctl: Sender<Control>,
    released: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SinkWorker {
    /// Open `path` and the default device on a fresh worker thread. Returns
    /// once the sink is prepared (paused) or the attempt failed.
    pub(super) fn spawn(
        path: &Path,
        mode: SourceMode,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Result<Self, BackendError> {
        let path = path.to_path_buf();
        let released = notifier.release_flag();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<Arc<Sink>, BackendError>>(1);
        let (ctl_tx, ctl_rx) = mpsc::channel::<Control>();

        let join = thread::Builder::new()
            .name(format!("cadence-{:?}", mode).to_lowercase())
            .spawn(move || run_worker(path, mode, notifier, poll_interval, ready_tx, ctl_rx))
            .map_err(|e| BackendError::DeviceUnavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(sink)) => Ok(Self {
                sink,
                ctl: ctl_tx,
                released,
                join: Some(join),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => {
                let _ = join.join();
                Err(BackendError::DeviceUnavailable(
                    "sink worker exited during open".to_string(),
                ))
            }
        }
    }

    pub(super) fn sink(&self) -> &Sink {
        &self.sink
    }

    pub(super) fn close(&mut self) {
        self.released.store(true, Ordering::SeqCst);
        self.sink.stop();
        let _ = self.ctl.send(Control::Close);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for SinkWorker {
    fn drop(&mut self) {
        self.close();
    }
}

fn load(path: &Path, mode: SourceMode) -> Result<Loaded, BackendError> {
    match mode {
        SourceMode::Streaming => {
            let file = File::open(path).map_err(|e| BackendError::from_io(path, &e))?;
            let decoder = Decoder::new(BufReader::new(file))
                .map_err(|e| BackendError::DecodeInit(e.to_string()))?;
            Ok(Loaded::Stream(decoder))
        }
        SourceMode::Buffered => {
            let bytes = std::fs::read(path).map_err(|e| BackendError::from_io(path, &e))?;
            let decoder = Decoder::new(Cursor::new(bytes))
                .map_err(|e| BackendError::DecodeInit(e.to_string()))?;
            Ok(Loaded::Clip(decoder.buffered()))
        }
    }
}

fn run_worker(
    path: PathBuf,
    mode: SourceMode,
    notifier: Notifier,
    poll_interval: Duration,
    ready_tx: SyncSender<Result<Arc<Sink>, BackendError>>,
    ctl_rx: Receiver<Control>,
) {
    let source = match load(&path, mode) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let mut stream = match OutputStreamBuilder::open_default_stream() {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(BackendError::DeviceUnavailable(e.to_string())));
            return;
        }
    };
    // rodio logs to stderr when OutputStream is dropped; the terminal belongs to the UI.
    stream.log_on_drop(false);

    let sink = Arc::new(Sink::connect_new(stream.mixer()));
    sink.pause();
    match source {
        Loaded::Stream(s) => sink.append(s),
        Loaded::Clip(s) => sink.append(s),
    }

    if ready_tx.send(Ok(Arc::clone(&sink))).is_err() {
        return;
    }

    loop {
        match ctl_rx.recv_timeout(poll_interval) {
            Ok(Control::Close) | Err(RecvTimeoutError::Disconnected) => {
                sink.stop();
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                if sink.is_paused() || !sink.empty() {
                    continue;
                }
                if sink.get_pos().is_zero() {
                    tracing::warn!(path = %path.display(), "no audio frames decoded");
                    notifier.failed(BackendError::DecodeInit(format!(
                        "{}: no audio frames decoded",
                        path.display()
                    )));
                } else {
                    notifier.finished();
                }
                return;
            }
        }
    }
}
