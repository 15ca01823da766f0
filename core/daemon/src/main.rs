//! Gemini watchdog entrypoint.
//!
//! A single-threaded background watcher: every pass it finds console-hosted
//! Gemini CLI sessions, reads their title and screen tail, and raises a
//! desktop notification when one needs attention while out of focus.

use std::path::PathBuf;
use tracing::{info, warn};

use clap::Parser;
use watch_core::{load_config, ConsoleReader, SysinfoProcessTable, WatchConfig, Watchdog};

mod logging;
mod notify;
mod platform;

use notify::DesktopSink;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Parser)]
#[command(name = "gemini-watchdog")]
#[command(about = "Desktop notifications for Gemini CLI sessions running in consoles")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ~/.gemini-watchdog/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Delay between passes in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Run a single pass, log what was found, and exit
    #[arg(long)]
    once: bool,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let config = effective_config(&cli);
    if !platform::SUPPORTED {
        warn!("Console attach is only available on Windows; no sessions will be discovered");
    }

    info!(
        hosts = ?config.host_executables,
        interval_ms = config.poll_interval_ms,
        read_budget_chars = config.read_budget_chars,
        "Gemini watchdog started"
    );

    let console = ConsoleReader::new(
        platform::PlatformConsole::default(),
        config.read_budget_chars,
    );
    let mut watchdog = Watchdog::new(
        config,
        console,
        SysinfoProcessTable::new(),
        platform::PlatformWindows::default(),
        DesktopSink,
    );

    if cli.once {
        if let Some(report) = watchdog.run_pass_logged() {
            info!(
                discovered = report.discovered.len(),
                failures = report.failures.len(),
                "Single pass complete"
            );
        }
        for pid in watchdog.registry().pids() {
            if let Some(target) = watchdog.registry().get(pid) {
                info!(
                    pid,
                    state = %target.state,
                    console = ?target.console,
                    "Tracked target"
                );
            }
        }
        return;
    }

    watchdog.run();
}

fn effective_config(cli: &Cli) -> WatchConfig {
    let path = match cli.config.clone().map(Ok).unwrap_or_else(default_config_path) {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(error = %err, "Failed to resolve config path; using defaults");
            None
        }
    };

    let mut config = match path {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "Failed to load config; using defaults");
                WatchConfig::default()
            }
        },
        None => WatchConfig::default(),
    };

    match cli.interval_ms {
        Some(0) => warn!("Ignoring --interval-ms 0"),
        Some(interval_ms) => config.poll_interval_ms = interval_ms,
        None => {}
    }
    config
}

pub(crate) fn watchdog_home() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Home directory not found".to_string())?;
    Ok(home.join(".gemini-watchdog"))
}

fn default_config_path() -> Result<PathBuf, String> {
    Ok(watchdog_home()?.join(CONFIG_FILE_NAME))
}
