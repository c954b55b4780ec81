//! File-based logging.
//!
//! The TUI owns the terminal, so tracing output goes to daily rolling files
//! under the configured directory.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogSettings;

const LOG_FILE_PREFIX: &str = "cadence";

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(settings: &LogSettings) -> anyhow::Result<WorkerGuard> {
    let dir = Path::new(&settings.directory);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("cadence=info,warn"));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(directory = %dir.display(), "logging initialized");
    Ok(guard)
}
