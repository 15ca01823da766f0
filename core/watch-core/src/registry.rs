use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::process::ProcessTable;
use crate::types::{ConsoleHandle, Target, TargetState};

/// Authoritative pid → target mapping for the lifetime of the watchdog.
///
/// At most one target owns a console handle. Wrapper shells and the node
/// process they host share a console; whichever is discovered first wins.
// TODO: key handle ownership on (handle, pid start time) once sysinfo start
// times are threaded through, so a recycled window handle cannot merge two
// unrelated sessions.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: HashMap<u32, Target>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every target whose process is gone. Returns the removed
    /// targets in pid order.
    pub fn prune_dead<P: ProcessTable + ?Sized>(&mut self, processes: &mut P) -> Vec<Target> {
        let mut dead: Vec<u32> = self
            .targets
            .keys()
            .copied()
            .filter(|pid| !processes.exists(*pid))
            .collect();
        dead.sort_unstable();
        dead.iter()
            .filter_map(|pid| self.targets.remove(pid))
            .collect()
    }

    pub fn tracked_handles(&self) -> HashSet<ConsoleHandle> {
        self.targets
            .values()
            .filter_map(|target| target.console)
            .collect()
    }

    pub fn tracked_pids(&self) -> HashSet<u32> {
        self.targets.keys().copied().collect()
    }

    /// Inserts a new `Unknown` target unless the pid or handle is taken.
    /// Returns whether a target was inserted.
    pub fn upsert(
        &mut self,
        pid: u32,
        console: Option<ConsoleHandle>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.targets.contains_key(&pid) {
            return false;
        }
        if let Some(handle) = console {
            if self.targets.values().any(|t| t.console == Some(handle)) {
                return false;
            }
        }
        self.targets.insert(pid, Target::new(pid, console, now));
        true
    }

    /// Overwrites the state. Returns the previous target snapshot, or `None`
    /// when `pid` is not tracked.
    pub fn set_state(
        &mut self,
        pid: u32,
        state: TargetState,
        now: DateTime<Utc>,
    ) -> Option<Target> {
        let target = self.targets.get_mut(&pid)?;
        let previous = target.clone();
        target.state = state;
        target.state_since = now;
        Some(previous)
    }

    pub fn get(&self, pid: u32) -> Option<&Target> {
        self.targets.get(&pid)
    }

    /// Tracked pids in ascending order.
    pub fn pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.targets.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::process::ProcessEntry;

    struct LiveSet(HashSet<u32>);

    impl ProcessTable for LiveSet {
        fn list(&mut self) -> Result<Vec<ProcessEntry>> {
            Ok(Vec::new())
        }

        fn exists(&mut self, pid: u32) -> bool {
            self.0.contains(&pid)
        }
    }

    #[test]
    fn upsert_rejects_shared_console_handle() {
        let now = Utc::now();
        let mut registry = TargetRegistry::new();
        assert!(registry.upsert(10, Some(ConsoleHandle(7)), now));
        assert!(!registry.upsert(11, Some(ConsoleHandle(7)), now));
        assert_eq!(registry.pids(), vec![10]);
    }

    #[test]
    fn upsert_is_noop_for_known_pid() {
        let now = Utc::now();
        let mut registry = TargetRegistry::new();
        assert!(registry.upsert(10, Some(ConsoleHandle(7)), now));
        registry.set_state(10, TargetState::Working, now);
        assert!(!registry.upsert(10, Some(ConsoleHandle(8)), now));
        let target = registry.get(10).expect("target");
        assert_eq!(target.state, TargetState::Working);
        assert_eq!(target.console, Some(ConsoleHandle(7)));
    }

    #[test]
    fn targets_without_handle_never_collide() {
        let now = Utc::now();
        let mut registry = TargetRegistry::new();
        assert!(registry.upsert(1, None, now));
        assert!(registry.upsert(2, None, now));
        assert!(registry.tracked_handles().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn prune_dead_removes_exited_pids_and_frees_handles() {
        let now = Utc::now();
        let mut registry = TargetRegistry::new();
        registry.upsert(1, Some(ConsoleHandle(100)), now);
        registry.upsert(2, Some(ConsoleHandle(200)), now);

        let mut live = LiveSet(HashSet::from([2]));
        let pruned = registry.prune_dead(&mut live);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].pid, 1);
        assert_eq!(pruned[0].discovered_at, now);
        assert!(registry.get(1).is_none());
        assert_eq!(registry.tracked_handles(), HashSet::from([ConsoleHandle(200)]));

        assert!(registry.upsert(3, Some(ConsoleHandle(100)), now));
    }

    #[test]
    fn set_state_returns_previous_and_stamps_time() {
        let start = Utc::now();
        let later = start + chrono::Duration::seconds(30);
        let mut registry = TargetRegistry::new();
        registry.upsert(4, None, start);

        let previous = registry
            .set_state(4, TargetState::AwaitingInput, later)
            .expect("tracked");
        assert_eq!(previous.state, TargetState::Unknown);
        assert_eq!(previous.state_since, start);
        assert_eq!(registry.get(4).map(|t| t.state_since), Some(later));
        assert!(registry.set_state(99, TargetState::Ready, later).is_none());
    }
}
