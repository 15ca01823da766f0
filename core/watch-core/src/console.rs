//! Exclusive console access.
//!
//! A process can be attached to at most one console. To read another
//! session's title and screen we must give up our own console, attach to the
//! target's, read, and then re-attach to our parent's console. This module
//! owns that protocol:
//!
//! - [`ConsoleApi`] is the raw OS boundary (free/attach/read primitives).
//! - [`AttachedConsole`] is the single-slot guard; dropping it always restores
//!   our own console, including on early-return error paths.
//! - [`ConsoleReader`] implements [`ConsolePort`] on top of both.
//!
//! # Exclusivity
//!
//! The guard mutably borrows the `ConsoleApi`, so a second read cannot start
//! while one is attached. The daemon builds exactly one reader per process.
//!
//! # Logging
//!
//! Our stdout is the foreign console while attached. Nothing in the attached
//! scope logs; diagnostics are collected and emitted after restore.

use std::ops::{Deref, DerefMut};

use crate::error::TargetFailure;
use crate::types::{ConsoleHandle, ConsoleSnapshot};

/// Default screen tail length in characters.
pub const DEFAULT_READ_BUDGET: usize = 8000;

/// Raw console primitives. Errors are human-readable reasons.
pub trait ConsoleApi {
    /// Releases whatever console we are attached to. Never fails loudly.
    fn detach(&mut self);

    fn attach(&mut self, pid: u32) -> Result<(), String>;

    /// Re-attaches to our parent's console.
    fn restore_own(&mut self);

    fn title(&mut self) -> Result<String, String>;

    fn window(&mut self) -> Option<ConsoleHandle>;

    /// Screen buffer size as (width, height) in cells.
    fn buffer_size(&mut self) -> Result<(usize, usize), String>;

    fn read_chars(&mut self, row: usize, col: usize, max_chars: usize) -> Result<String, String>;
}

/// Reads one process's console. Implementations must leave our own console
/// attached when they return.
pub trait ConsolePort {
    fn read(&mut self, pid: u32) -> Result<ConsoleSnapshot, TargetFailure>;
}

/// Scoped attachment to a foreign console.
pub struct AttachedConsole<'a, A: ConsoleApi> {
    api: &'a mut A,
}

impl<'a, A: ConsoleApi> AttachedConsole<'a, A> {
    /// Detaches from our console and attaches to `pid`'s.
    ///
    /// On failure our console is restored before the error is returned.
    pub fn attach(api: &'a mut A, pid: u32) -> Result<Self, String> {
        api.detach();
        if let Err(reason) = api.attach(pid) {
            api.restore_own();
            return Err(reason);
        }
        Ok(Self { api })
    }
}

impl<A: ConsoleApi> Deref for AttachedConsole<'_, A> {
    type Target = A;

    fn deref(&self) -> &A {
        self.api
    }
}

impl<A: ConsoleApi> DerefMut for AttachedConsole<'_, A> {
    fn deref_mut(&mut self) -> &mut A {
        self.api
    }
}

impl<A: ConsoleApi> Drop for AttachedConsole<'_, A> {
    fn drop(&mut self) {
        self.api.detach();
        self.api.restore_own();
    }
}

/// Linear tail offset converted to a (row, column) read origin.
pub fn tail_origin(width: usize, height: usize, budget: usize) -> (usize, usize) {
    if width == 0 {
        return (0, 0);
    }
    let total = width.saturating_mul(height);
    let start = total.saturating_sub(budget);
    (start / width, start % width)
}

fn read_tail<A: ConsoleApi>(api: &mut A, budget: usize) -> Result<String, String> {
    let (width, height) = api.buffer_size()?;
    let (row, col) = tail_origin(width, height, budget);
    api.read_chars(row, col, budget)
}

#[derive(Debug)]
pub struct ConsoleReader<A: ConsoleApi> {
    api: A,
    read_budget: usize,
}

impl<A: ConsoleApi> ConsoleReader<A> {
    pub fn new(api: A, read_budget: usize) -> Self {
        Self { api, read_budget }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: ConsoleApi> ConsolePort for ConsoleReader<A> {
    fn read(&mut self, pid: u32) -> Result<ConsoleSnapshot, TargetFailure> {
        let budget = self.read_budget;
        let (snapshot, buffer_error) = {
            let mut console = AttachedConsole::attach(&mut self.api, pid)
                .map_err(|reason| TargetFailure::Attach { pid, reason })?;
            let title = console
                .title()
                .map_err(|reason| TargetFailure::Read { pid, reason })?;
            let window = console.window();
            let (screen_tail, buffer_error) = match read_tail(&mut *console, budget) {
                Ok(text) => (text, None),
                Err(reason) => (String::new(), Some(reason)),
            };
            (
                ConsoleSnapshot {
                    title,
                    screen_tail,
                    console: window,
                },
                buffer_error,
            )
        };

        if let Some(reason) = buffer_error {
            tracing::debug!(pid, reason = %reason, "Screen buffer unreadable; using title only");
        }
        Ok(snapshot)
    }
}
