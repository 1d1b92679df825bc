// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! Logs go to stderr. With a log directory they are also written to a daily
//! rotated `tbd.log` there. `RUST_LOG` overrides the default `info` filter.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix of the rotated log file.
pub const LOG_FILE: &str = "tbd.log";

/// Errors from installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("creating log directory {path}: {source}")]
    LogDir { path: String, source: std::io::Error },
    #[error("installing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter from `RUST_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when a log directory is given. Dropping
/// it flushes buffered lines, so hold it until shutdown.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let stderr = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(env_filter()).with(stderr).try_init()?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .map_err(|source| LoggingError::LogDir { path: dir.display().to_string(), source })?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer().with_ansi(false).with_writer(writer);

    tracing_subscriber::registry().with(env_filter()).with(stderr).with(file).try_init()?;
    Ok(Some(guard))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
