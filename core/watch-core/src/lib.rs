//! # watch-core
//!
//! Detection engine for Gemini Watchdog. Finds console-hosted Gemini CLI
//! sessions, reads their title and screen tail, classifies the task state and
//! decides when a desktop notification is warranted.
//!
//! ## Design Principles
//!
//! - **Synchronous, single-threaded**: one pass at a time, one console read at a time.
//! - **Ports at the OS boundary**: console, window, process and notification
//!   access are traits; the daemon binds them to Win32 and `notify-rust`.
//! - **Graceful degradation**: per-target failures are logged and skipped,
//!   never fatal to the loop.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use watch_core::{Watchdog, WatchConfig};
//!
//! let mut watchdog = Watchdog::new(config, console, processes, windows, sink);
//! watchdog.run();
//! ```

pub mod classifier;
pub mod config;
pub mod console;
pub mod error;
pub mod focus;
pub mod notifier;
pub mod patterns;
pub mod process;
pub mod registry;
pub mod types;
pub mod watcher;

pub use classifier::{classify, decide, Decision};
pub use config::{load_config, NotificationConfig, WatchConfig};
pub use console::{ConsoleApi, ConsolePort, ConsoleReader};
pub use error::{Result, TargetFailure, WatchError};
pub use focus::{ForegroundInspector, WindowSystem};
pub use notifier::{NotificationKind, NotificationSink, NotifyOutcome, Notifier};
pub use patterns::MarkerTable;
pub use process::{ProcessEntry, ProcessTable, SysinfoProcessTable};
pub use registry::TargetRegistry;
pub use types::{ClassificationInput, ConsoleHandle, ConsoleSnapshot, Target, TargetState};
pub use watcher::{PassReport, Watchdog};
