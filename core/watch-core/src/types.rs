//! Shared value types for targets and console reads.

use chrono::{DateTime, Utc};

/// Opaque console window handle, stored as the raw pointer-sized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsoleHandle(pub isize);

impl std::fmt::Display for ConsoleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Task state inferred for a tracked CLI session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    Unknown,
    Working,
    AwaitingInput,
    HighDemand,
    Ready,
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetState::Unknown => write!(f, "unknown"),
            TargetState::Working => write!(f, "working"),
            TargetState::AwaitingInput => write!(f, "awaiting_input"),
            TargetState::HighDemand => write!(f, "high_demand"),
            TargetState::Ready => write!(f, "ready"),
        }
    }
}

/// One tracked CLI session.
///
/// NOTE: `console` may be `None` when the OS refused to hand out a window
/// handle. Such targets never participate in handle deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub pid: u32,
    pub console: Option<ConsoleHandle>,
    pub state: TargetState,
    /// Reported as the tracked duration when the process exits.
    pub discovered_at: DateTime<Utc>,
    pub state_since: DateTime<Utc>,
}

impl Target {
    pub fn new(pid: u32, console: Option<ConsoleHandle>, now: DateTime<Utc>) -> Self {
        Self {
            pid,
            console,
            state: TargetState::Unknown,
            discovered_at: now,
            state_since: now,
        }
    }
}

/// Result of one console read: title, bounded screen tail, and window handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleSnapshot {
    pub title: String,
    pub screen_tail: String,
    pub console: Option<ConsoleHandle>,
}

impl ConsoleSnapshot {
    pub fn input(&self) -> ClassificationInput<'_> {
        ClassificationInput {
            title: &self.title,
            screen_tail: self.screen_tail.trim(),
        }
    }
}

/// Ephemeral classifier input, borrowed from a fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationInput<'a> {
    pub title: &'a str,
    pub screen_tail: &'a str,
}
