//! Error types for backend open/start failures

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a backend could not take a track. Every variant is recoverable:
/// the engine falls through to the next backend in the chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The path does not exist at play time
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No real backend handles this extension
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The output device could not be acquired (or went away)
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Recognized by extension but the payload would not open
    #[error("decoder failed to initialise: {0}")]
    DecodeInit(String),
}

impl BackendError {
    /// Map an I/O failure on `path` to the matching variant.
    pub fn from_io(path: &std::path::Path, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::DecodeInit(format!("{}: {}", path.display(), err))
        }
    }
}
