//! Notification policy: suppress when the user is already looking, otherwise
//! hand off to the desktop sink. Delivery failures stop here.

use tracing::{info, warn};

use crate::config::NotificationConfig;
use crate::error::WatchError;
use crate::focus::{ForegroundInspector, WindowSystem};
use crate::types::ConsoleHandle;

/// Transitions worth interrupting the user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    ActionRequired,
    HighDemand,
    TaskFinished,
}

impl NotificationKind {
    pub fn message(&self, pid: u32) -> String {
        match self {
            Self::ActionRequired => format!("Action Required (PID {pid})! ✋"),
            Self::HighDemand => format!("Task Failed - High Demand (PID {pid}) ⚠️"),
            Self::TaskFinished => format!("Task Finished (PID {pid}) ✅"),
        }
    }
}

/// Payload handed to the desktop notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub app_name: String,
    pub timeout_secs: u32,
}

pub trait NotificationSink {
    fn deliver(&mut self, notification: &Notification) -> Result<(), WatchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    Suppressed,
    Failed,
}

pub struct Notifier<W: WindowSystem, S: NotificationSink> {
    focus: ForegroundInspector<W>,
    sink: S,
    config: NotificationConfig,
}

impl<W: WindowSystem, S: NotificationSink> Notifier<W, S> {
    pub fn new(focus: ForegroundInspector<W>, sink: S, config: NotificationConfig) -> Self {
        Self {
            focus,
            sink,
            config,
        }
    }

    pub fn notify(
        &mut self,
        title: &str,
        message: &str,
        console: Option<ConsoleHandle>,
    ) -> NotifyOutcome {
        if self.focus.is_focused(console) {
            info!(
                notification_title = title,
                body = message,
                "Notification suppressed; console in focus"
            );
            return NotifyOutcome::Suppressed;
        }

        info!(notification_title = title, body = message, "Notification");
        let notification = Notification {
            title: title.to_string(),
            message: message.to_string(),
            app_name: self.config.app_name.clone(),
            timeout_secs: self.config.timeout_secs,
        };
        match self.sink.deliver(&notification) {
            Ok(()) => NotifyOutcome::Delivered,
            Err(err) => {
                warn!(error = %err, "Notification failed");
                NotifyOutcome::Failed
            }
        }
    }

    /// Notifies about `kind` for `pid`, titled with the configured app name.
    pub fn notify_target(
        &mut self,
        pid: u32,
        kind: NotificationKind,
        console: Option<ConsoleHandle>,
    ) -> NotifyOutcome {
        let title = self.config.app_name.clone();
        self.notify(&title, &kind.message(pid), console)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
