use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Keep alive until exit; dropping it flushes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Logs go to a file only. The terminal belongs to the UI, so nothing is written to stderr.
pub fn init(log_path: &Path) -> Result<LoggingGuard> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {:?}", log_path))?;
    let (writer, file_guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env("NOTECARDS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("installing log subscriber")?;

    tracing::info!(log_path = %log_path.display(), "logging initialized");
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
