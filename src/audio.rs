//! Playback: the engine state machine and its audio backends.

mod backend;
mod buffered;
mod engine;
mod error;
mod history;
mod notify;
mod shuffle;
mod simulated;
mod sink;
mod streaming;
mod types;

pub use engine::PlaybackEngine;
pub use types::{PlaybackState, PlaybackStatus};

#[cfg(test)]
pub use types::BackendKind;
