//! Tracing and logging configuration for the application
//!
//! Logs always go to the configured log file. Development additionally
//! mirrors human-readable output to stdout; production writes JSON lines.

use std::{io, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Initialize tracing/logging based on the environment
///
/// The parent directory of `log_path` is created if missing. The returned
/// guard flushes buffered log lines on drop and must be held for the
/// lifetime of the process.
///
/// # Environment Variables
/// - `RUST_LOG`: Override default log level (e.g., `RUST_LOG=debug,tower_http=trace`)
pub fn init_tracing(env: &Environment, log_path: &str) -> io::Result<WorkerGuard> {
    let (file_writer, guard) = file_writer(log_path)?;

    if env.is_development() {
        init_development_tracing(file_writer);
    } else {
        init_production_tracing(file_writer);
    }

    Ok(guard)
}

fn file_writer(
    log_path: &str,
) -> io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = Path::new(log_path);
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {log_path}"),
        )
    })?;

    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn init_development_tracing(file_writer: tracing_appender::non_blocking::NonBlocking) {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug,tower_http=debug"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(file_writer)
                .with_filter(env_filter()),
        )
        .init();

    tracing::info!("Tracing initialized in development mode");
}

fn init_production_tracing(file_writer: tracing_appender::non_blocking::NonBlocking) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_target(true)
                .with_writer(file_writer)
                .with_filter(env_filter),
        )
        .init();

    tracing::info!("Tracing initialized in production mode");
}
