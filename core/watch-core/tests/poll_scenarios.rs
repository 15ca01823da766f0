//! End-to-end poll passes against an in-memory process/console/window world.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use watch_core::notifier::Notification;
use watch_core::{
    ConsoleHandle, ConsolePort, ConsoleSnapshot, NotificationKind, NotificationSink, NotifyOutcome,
    ProcessTable, TargetFailure, TargetState, WatchConfig, WatchError, Watchdog, WindowSystem,
};
use watch_core::process::ProcessEntry;

const SELF_PID: u32 = 1;

#[derive(Default)]
struct WorldState {
    processes: Vec<ProcessEntry>,
    consoles: HashMap<u32, ConsoleSnapshot>,
    refuse_attach: HashSet<u32>,
    crash_on_read: HashSet<u32>,
    fail_listing: bool,
    foreground: Option<ConsoleHandle>,
    delivered: Vec<Notification>,
    reads: Vec<u32>,
}

#[derive(Clone, Default)]
struct World {
    state: Arc<Mutex<WorldState>>,
}

impl World {
    fn with<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        f(&mut self.state.lock().expect("lock world"))
    }

    fn spawn(&self, pid: u32, name: &str, handle: u32, title: &str, screen: &str) {
        self.with(|state| {
            state.processes.push(ProcessEntry {
                pid,
                name: name.to_string(),
            });
            state.consoles.insert(
                pid,
                ConsoleSnapshot {
                    title: title.to_string(),
                    screen_tail: screen.to_string(),
                    console: Some(ConsoleHandle(handle as isize)),
                },
            );
        });
    }

    fn kill(&self, pid: u32) {
        self.with(|state| {
            state.processes.retain(|entry| entry.pid != pid);
            state.consoles.remove(&pid);
        });
    }

    fn show(&self, pid: u32, title: &str, screen: &str) {
        self.with(|state| {
            let console = state.consoles.get_mut(&pid).expect("console exists");
            console.title = title.to_string();
            console.screen_tail = screen.to_string();
        });
    }

    fn delivered(&self) -> Vec<Notification> {
        self.with(|state| state.delivered.clone())
    }
}

impl ConsolePort for World {
    fn read(&mut self, pid: u32) -> Result<ConsoleSnapshot, TargetFailure> {
        // Panic outside the lock so the world stays usable afterwards.
        if self.with(|state| state.crash_on_read.contains(&pid)) {
            panic!("console read crashed for pid {pid}");
        }
        self.with(|state| {
            state.reads.push(pid);
            if state.refuse_attach.contains(&pid) {
                return Err(TargetFailure::Attach {
                    pid,
                    reason: "access denied".to_string(),
                });
            }
            state.consoles.get(&pid).cloned().ok_or(TargetFailure::Attach {
                pid,
                reason: "no such process".to_string(),
            })
        })
    }
}

impl ProcessTable for World {
    fn list(&mut self) -> watch_core::Result<Vec<ProcessEntry>> {
        self.with(|state| {
            if state.fail_listing {
                return Err(WatchError::ProcessEnumeration("snapshot failed".to_string()));
            }
            Ok(state.processes.clone())
        })
    }

    fn exists(&mut self, pid: u32) -> bool {
        self.with(|state| state.processes.iter().any(|entry| entry.pid == pid))
    }
}

impl WindowSystem for World {
    fn foreground_window(&self) -> Option<ConsoleHandle> {
        self.with(|state| state.foreground)
    }

    fn is_minimized(&self, _window: ConsoleHandle) -> bool {
        false
    }

    fn window_title(&self, _window: ConsoleHandle) -> String {
        "Desktop".to_string()
    }
}

impl NotificationSink for World {
    fn deliver(&mut self, notification: &Notification) -> watch_core::Result<()> {
        self.with(|state| state.delivered.push(notification.clone()));
        Ok(())
    }
}

fn watchdog(world: &World) -> Watchdog<World, World, World, World> {
    Watchdog::new(
        WatchConfig::default(),
        world.clone(),
        world.clone(),
        world.clone(),
        world.clone(),
    )
    .with_self_pid(SELF_PID)
}

fn state_of(dog: &Watchdog<World, World, World, World>, pid: u32) -> Option<TargetState> {
    dog.registry().get(pid).map(|target| target.state)
}

#[test]
fn scenario_a_working_to_awaiting_input_notifies_once() {
    let world = World::default();
    world.spawn(100, "node.exe", 0x10, "✦ Working", "");
    let mut dog = watchdog(&world);

    dog.run_pass().expect("pass 1");
    assert_eq!(state_of(&dog, 100), Some(TargetState::Working));

    world.show(100, "✦ Working", "Interactive shell awaiting input");
    let report = dog.run_pass().expect("pass 2");
    assert_eq!(state_of(&dog, 100), Some(TargetState::AwaitingInput));
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].kind, NotificationKind::ActionRequired);

    let delivered = world.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].message.contains("Action Required"));

    let report = dog.run_pass().expect("pass 3");
    assert!(report.notifications.is_empty());
    assert_eq!(world.delivered().len(), 1);
}

#[test]
fn scenario_b_high_demand_from_unknown() {
    let world = World::default();
    world.spawn(200, "pwsh.exe", 0x20, "gemini", "Keep trying? [Stop]");
    let mut dog = watchdog(&world);

    let report = dog.run_pass().expect("pass");
    assert_eq!(report.discovered, vec![200]);
    assert_eq!(state_of(&dog, 200), Some(TargetState::HighDemand));

    let delivered = world.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].message.contains("High Demand"));
}

#[test]
fn scenario_c_working_title_is_silent() {
    let world = World::default();
    world.spawn(300, "node.exe", 0x30, "✦ Working", "");
    let mut dog = watchdog(&world);

    let report = dog.run_pass().expect("pass");
    assert_eq!(state_of(&dog, 300), Some(TargetState::Working));
    assert_eq!(report.transitions.len(), 1);
    assert!(report.notifications.is_empty());
    assert!(world.delivered().is_empty());
}

#[test]
fn scenario_d_ready_after_working_notifies_once() {
    let world = World::default();
    world.spawn(400, "node.exe", 0x40, "✦ Working", "");
    let mut dog = watchdog(&world);
    dog.run_pass().expect("pass 1");

    world.show(400, "◇ Ready", "");
    dog.run_pass().expect("pass 2");
    assert_eq!(state_of(&dog, 400), Some(TargetState::Ready));

    dog.run_pass().expect("pass 3");
    let delivered = world.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].message.contains("Finished"));
}

#[test]
fn ready_on_first_discovery_is_silent() {
    let world = World::default();
    world.spawn(410, "node.exe", 0x41, "◇ Ready", "");
    let mut dog = watchdog(&world);

    dog.run_pass().expect("pass");
    assert_eq!(state_of(&dog, 410), Some(TargetState::Unknown));
    assert!(world.delivered().is_empty());
}

#[test]
fn scenario_e_dead_target_is_pruned_and_handle_reclaimed() {
    let world = World::default();
    world.spawn(500, "node.exe", 0x50, "gemini", "");
    let mut dog = watchdog(&world);
    dog.run_pass().expect("pass 1");
    assert!(dog.registry().get(500).is_some());

    world.kill(500);
    world.spawn(501, "node.exe", 0x50, "gemini", "");
    let report = dog.run_pass().expect("pass 2");

    assert_eq!(report.pruned, vec![500]);
    assert_eq!(report.discovered, vec![501]);
    assert!(dog.registry().get(500).is_none());
    assert_eq!(
        dog.registry().get(501).and_then(|target| target.console),
        Some(ConsoleHandle(0x50))
    );
}

#[test]
fn shared_console_yields_single_target() {
    let world = World::default();
    world.spawn(600, "powershell.exe", 0x60, "gemini", "");
    world.spawn(601, "node.exe", 0x60, "gemini", "");
    let mut dog = watchdog(&world);

    let report = dog.run_pass().expect("pass");
    assert_eq!(report.discovered, vec![600]);
    assert_eq!(dog.registry().len(), 1);
}

#[test]
fn non_matching_and_non_host_processes_are_ignored() {
    let world = World::default();
    world.spawn(700, "cmd.exe", 0x70, "C:\\Windows\\system32\\cmd.exe", "dir");
    world.spawn(701, "explorer.exe", 0x71, "gemini", "");
    world.spawn(SELF_PID, "node.exe", 0x72, "gemini", "");
    let mut dog = watchdog(&world);

    let report = dog.run_pass().expect("pass");
    assert!(report.discovered.is_empty());
    assert!(dog.registry().is_empty());
    let reads = world.with(|state| state.reads.clone());
    assert_eq!(reads, vec![700]);
}

#[test]
fn focused_console_suppresses_notification() {
    let world = World::default();
    world.spawn(800, "node.exe", 0x80, "gemini", "Action Required");
    world.with(|state| state.foreground = Some(ConsoleHandle(0x80)));
    let mut dog = watchdog(&world);

    let report = dog.run_pass().expect("pass");
    assert_eq!(state_of(&dog, 800), Some(TargetState::AwaitingInput));
    assert_eq!(report.notifications[0].outcome, NotifyOutcome::Suppressed);
    assert!(world.delivered().is_empty());
}

#[test]
fn attach_failure_leaves_target_unchanged() {
    let world = World::default();
    world.spawn(900, "node.exe", 0x90, "✦ Working", "");
    world.spawn(901, "node.exe", 0x91, "✦ Working", "");
    let mut dog = watchdog(&world);
    dog.run_pass().expect("pass 1");

    world.with(|state| {
        state.refuse_attach.insert(900);
    });
    world.show(900, "◇ Ready", "");
    world.show(901, "◇ Ready", "");
    let report = dog.run_pass().expect("pass 2");

    assert_eq!(state_of(&dog, 900), Some(TargetState::Working));
    assert_eq!(state_of(&dog, 901), Some(TargetState::Ready));
    assert!(report
        .failures
        .iter()
        .any(|failure| matches!(failure, TargetFailure::Attach { pid: 900, .. })));
}

#[test]
fn failed_enumeration_abandons_pass_but_not_loop() {
    let world = World::default();
    world.spawn(1000, "node.exe", 0xA0, "gemini", "");
    world.with(|state| state.fail_listing = true);
    let mut dog = watchdog(&world);

    assert!(dog.run_pass().is_err());
    assert!(dog.run_pass_logged().is_none());

    world.with(|state| state.fail_listing = false);
    let report = dog.run_pass_logged().expect("recovered pass");
    assert_eq!(report.discovered, vec![1000]);
}

#[test]
fn panicking_console_read_abandons_pass_but_not_loop() {
    let world = World::default();
    world.spawn(1100, "node.exe", 0xB0, "✦ Working", "");
    world.with(|state| {
        state.crash_on_read.insert(1100);
    });
    let mut dog = watchdog(&world);

    assert!(dog.run_pass_logged().is_none());
    assert!(dog.registry().is_empty());

    world.with(|state| {
        state.crash_on_read.clear();
    });
    let report = dog.run_pass_logged().expect("recovered pass");
    assert_eq!(report.discovered, vec![1100]);
    assert_eq!(state_of(&dog, 1100), Some(TargetState::Working));
}
