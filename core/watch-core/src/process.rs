//! Process inspection: host enumeration and liveness.

use std::collections::HashSet;

use sysinfo::{Pid, ProcessRefreshKind, System};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

pub trait ProcessTable {
    fn list(&mut self) -> Result<Vec<ProcessEntry>>;

    fn exists(&mut self, pid: u32) -> bool;
}

/// `sysinfo`-backed process table. Keeps one `System` across passes so
/// refreshes only pay for the delta.
pub struct SysinfoProcessTable {
    system: System,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn list(&mut self) -> Result<Vec<ProcessEntry>> {
        self.system.refresh_processes();
        Ok(self
            .system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            })
            .collect())
    }

    fn exists(&mut self, pid: u32) -> bool {
        let sys_pid = Pid::from(pid as usize);
        self.system
            .refresh_process_specifics(sys_pid, ProcessRefreshKind::new())
            && self.system.process(sys_pid).is_some()
    }
}

/// Pids of allow-listed hosts, minus ourselves and anything already tracked.
/// Sorted so discovery order (and thus handle ownership) is deterministic.
pub fn candidate_pids(
    entries: &[ProcessEntry],
    host_executables: &[String],
    self_pid: u32,
    tracked: &HashSet<u32>,
) -> Vec<u32> {
    let allowed: HashSet<String> = host_executables
        .iter()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut pids: Vec<u32> = entries
        .iter()
        .filter(|entry| allowed.contains(&entry.name.to_lowercase()))
        .map(|entry| entry.pid)
        .filter(|pid| *pid != self_pid && !tracked.contains(pid))
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, name: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
        }
    }

    fn hosts() -> Vec<String> {
        vec!["node.exe".to_string(), "pwsh.exe".to_string()]
    }

    #[test]
    fn candidate_pids_filters_by_allow_list_case_insensitively() {
        let entries = vec![
            entry(30, "Node.EXE"),
            entry(10, "pwsh.exe"),
            entry(20, "explorer.exe"),
        ];
        let pids = candidate_pids(&entries, &hosts(), 1, &HashSet::new());
        assert_eq!(pids, vec![10, 30]);
    }

    #[test]
    fn candidate_pids_excludes_self_and_tracked() {
        let entries = vec![entry(1, "node.exe"), entry(2, "node.exe"), entry(3, "node.exe")];
        let tracked = HashSet::from([2]);
        let pids = candidate_pids(&entries, &hosts(), 1, &tracked);
        assert_eq!(pids, vec![3]);
    }

    #[test]
    fn sysinfo_table_sees_current_process() {
        let mut table = SysinfoProcessTable::new();
        let me = std::process::id();
        assert!(table.exists(me));
        let listed = table.list().expect("list processes");
        assert!(listed.iter().any(|entry| entry.pid == me));
    }
}
