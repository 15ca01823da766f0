//! Poll loop: prune, discover, classify, notify, sleep.
//!
//! Each pass is one synchronous sweep. Every console read goes through the
//! single [`ConsolePort`], so reads are strictly sequenced. Failures on one
//! candidate or target are isolated into the [`PassReport`]; only a failed
//! process enumeration abandons the pass.

use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{debug, info, warn};

use crate::classifier::{classify, decide};
use crate::config::WatchConfig;
use crate::console::ConsolePort;
use crate::error::{Result, TargetFailure};
use crate::focus::{ForegroundInspector, WindowSystem};
use crate::notifier::{NotificationKind, NotificationSink, Notifier, NotifyOutcome};
use crate::patterns::MarkerTable;
use crate::process::{candidate_pids, ProcessTable};
use crate::registry::TargetRegistry;
use crate::types::TargetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub pid: u32,
    pub from: TargetState,
    pub to: TargetState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentNotification {
    pub pid: u32,
    pub kind: NotificationKind,
    pub outcome: NotifyOutcome,
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub pruned: Vec<u32>,
    pub discovered: Vec<u32>,
    pub transitions: Vec<Transition>,
    pub notifications: Vec<SentNotification>,
    pub failures: Vec<TargetFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Discovery,
    Classification,
}

pub struct Watchdog<C, P, W, S>
where
    C: ConsolePort,
    P: ProcessTable,
    W: WindowSystem,
    S: NotificationSink,
{
    config: WatchConfig,
    markers: MarkerTable,
    registry: TargetRegistry,
    console: C,
    processes: P,
    notifier: Notifier<W, S>,
    self_pid: u32,
}

impl<C, P, W, S> Watchdog<C, P, W, S>
where
    C: ConsolePort,
    P: ProcessTable,
    W: WindowSystem,
    S: NotificationSink,
{
    pub fn new(config: WatchConfig, console: C, processes: P, windows: W, sink: S) -> Self {
        let markers = config.markers.table();
        let focus = ForegroundInspector::new(windows, markers.clone());
        let notifier = Notifier::new(focus, sink, config.notification.clone());
        Self {
            config,
            markers,
            registry: TargetRegistry::new(),
            console,
            processes,
            notifier,
            self_pid: std::process::id(),
        }
    }

    /// Overrides the pid excluded from discovery.
    pub fn with_self_pid(mut self, pid: u32) -> Self {
        self.self_pid = pid;
        self
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Polls forever; the delay runs after each pass completes.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_pass_logged();
            thread::sleep(self.config.poll_interval());
        }
    }

    /// Runs one pass, logging instead of propagating any failure.
    pub fn run_pass_logged(&mut self) -> Option<PassReport> {
        // A panicking adapter must not end the loop. The console guard restores
        // our console while unwinding.
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_pass())) {
            Ok(Ok(report)) => {
                debug!(
                    pruned = report.pruned.len(),
                    discovered = report.discovered.len(),
                    transitions = report.transitions.len(),
                    notifications = report.notifications.len(),
                    failures = report.failures.len(),
                    tracked = self.registry.len(),
                    "Watch pass complete"
                );
                Some(report)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Watch pass failed");
                None
            }
            Err(_) => {
                warn!("Watch pass panicked");
                None
            }
        }
    }

    pub fn run_pass(&mut self) -> Result<PassReport> {
        let now = Utc::now();
        let mut report = PassReport::default();

        for target in self.registry.prune_dead(&mut self.processes) {
            info!(
                pid = target.pid,
                last_state = %target.state,
                tracked_secs = (now - target.discovered_at).num_seconds(),
                "Target process exited; no longer tracking"
            );
            report.pruned.push(target.pid);
        }

        self.discover(now, &mut report)?;

        for pid in self.registry.pids() {
            let result = self.classify_target(pid, now, &mut report);
            isolate(&mut report, Phase::Classification, result);
        }

        Ok(report)
    }

    fn discover(&mut self, now: DateTime<Utc>, report: &mut PassReport) -> Result<()> {
        let entries = self.processes.list()?;
        let candidates = candidate_pids(
            &entries,
            &self.config.host_executables,
            self.self_pid,
            &self.registry.tracked_pids(),
        );
        let mut handles = self.registry.tracked_handles();

        for pid in candidates {
            let Some(snapshot) = isolate(report, Phase::Discovery, self.console.read(pid)) else {
                continue;
            };
            if let Some(handle) = snapshot.console {
                if handles.contains(&handle) {
                    continue;
                }
            }
            if !self.markers.is_cli_console(snapshot.input()) {
                continue;
            }
            if self.registry.upsert(pid, snapshot.console, now) {
                info!(
                    pid,
                    console = ?snapshot.console,
                    title = %snapshot.title,
                    "Tracking Gemini CLI console"
                );
                if let Some(handle) = snapshot.console {
                    handles.insert(handle);
                }
                report.discovered.push(pid);
            }
        }

        Ok(())
    }

    fn classify_target(
        &mut self,
        pid: u32,
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) -> std::result::Result<(), TargetFailure> {
        let snapshot = self.console.read(pid)?;
        let target = self
            .registry
            .get(pid)
            .ok_or(TargetFailure::NotTracked { pid })?;
        let current = target.state;
        let console = snapshot.console.or(target.console);

        let observed = classify(&self.markers, snapshot.input());
        let decision = decide(current, observed);

        if let Some(next) = decision.next {
            let previous = self
                .registry
                .set_state(pid, next, now)
                .ok_or(TargetFailure::NotTracked { pid })?;
            info!(
                pid,
                from = %previous.state,
                to = %next,
                secs_in_previous = (now - previous.state_since).num_seconds(),
                "Target state changed"
            );
            report.transitions.push(Transition {
                pid,
                from: previous.state,
                to: next,
            });
        }

        if let Some(kind) = decision.notify {
            let outcome = self.notifier.notify_target(pid, kind, console);
            report.notifications.push(SentNotification { pid, kind, outcome });
        }

        Ok(())
    }
}

/// Turns a per-target result into a log line and a report entry.
fn isolate<T>(
    report: &mut PassReport,
    phase: Phase,
    result: std::result::Result<T, TargetFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(failure) => {
            // Most hosts on the box are not ours and refuse or lack a console.
            if matches!(failure, TargetFailure::Attach { .. }) {
                debug!(pid = failure.pid(), phase = ?phase, error = %failure, "Console unavailable");
            } else {
                warn!(
                    pid = failure.pid(),
                    phase = ?phase,
                    kind = failure.kind(),
                    error = %failure,
                    "Skipping process this pass"
                );
            }
            report.failures.push(failure);
            None
        }
    }
}
