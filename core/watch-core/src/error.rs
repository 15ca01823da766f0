//! Error types for watch-core operations.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Per-target failures
// ═══════════════════════════════════════════════════════════════════════════════

/// Why one candidate or target produced no usable read this pass.
///
/// These never abort a pass; the poll loop logs them with the pid and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetFailure {
    #[error("console attach to pid {pid} failed: {reason}")]
    Attach { pid: u32, reason: String },

    #[error("console read for pid {pid} failed: {reason}")]
    Read { pid: u32, reason: String },

    #[error("pid {pid} is not tracked")]
    NotTracked { pid: u32 },
}

impl TargetFailure {
    pub fn pid(&self) -> u32 {
        match self {
            TargetFailure::Attach { pid, .. }
            | TargetFailure::Read { pid, .. }
            | TargetFailure::NotTracked { pid } => *pid,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TargetFailure::Attach { .. } => "attach",
            TargetFailure::Read { .. } => "read",
            TargetFailure::NotTracked { .. } => "not_tracked",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Engine errors
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can escape a watch-core operation.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration value invalid: {0}")]
    ConfigInvalid(String),

    // ─────────────────────────────────────────────────────────────────────
    // Pass Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Process enumeration failed: {0}")]
    ProcessEnumeration(String),

    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using WatchError.
pub type Result<T> = std::result::Result<T, WatchError>;
