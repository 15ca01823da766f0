//! Logging setup: stdout plus a daily-rolling file under ~/.gemini-watchdog/logs.
//!
//! The file log is the reliable record. Stdout belongs to whichever console we
//! are attached to, and some hosts do not re-bind our std handles after a read.

use fs_err as fs;
use std::env;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "watchdog.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of `main`, or buffered file output is lost.
pub fn init() -> Option<WorkerGuard> {
    let file_writer = log_dir().and_then(|dir| {
        fs::create_dir_all(&dir).ok()?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        Some(tracing_appender::non_blocking(appender))
    });

    match file_writer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            tracing::warn!("Log directory unavailable; logging to stdout only");
            None
        }
    }
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var("GEMINI_WATCHDOG_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn log_dir() -> Option<PathBuf> {
    crate::watchdog_home().ok().map(|home| home.join("logs"))
}
