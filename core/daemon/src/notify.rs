//! Desktop notification delivery via `notify_rust`.

use watch_core::notifier::Notification;
use watch_core::{NotificationSink, WatchError};

#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopSink;

impl NotificationSink for DesktopSink {
    fn deliver(&mut self, notification: &Notification) -> watch_core::Result<()> {
        notify_rust::Notification::new()
            .appname(&notification.app_name)
            .summary(&notification.title)
            .body(&notification.message)
            .timeout(notify_rust::Timeout::Milliseconds(
                notification.timeout_secs.saturating_mul(1000),
            ))
            .show()
            .map(|_| ())
            .map_err(|err| WatchError::NotificationDelivery(err.to_string()))
    }
}
