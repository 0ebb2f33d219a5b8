//! Logging setup: colored stderr plus a JSON log file rolled daily.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/trip_builder.log";

/// Opens a daily-rolling appender for `log_file_path`, creating its
/// directory when missing.
///
/// # Errors
///
/// Returns an error if the directory or the first log file cannot be created.
pub fn file_appender(log_file_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("trip_builder.log"));

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_file_name.to_string_lossy())
        .build(log_dir)
        .with_context(|| format!("failed to open log file '{}'", log_file_path.display()))
}

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must be held until the program exits.
pub fn init(log_file_path: &Path) -> Result<WorkerGuard> {
    let appender = file_appender(log_file_path)?;
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(file_guard)
}
