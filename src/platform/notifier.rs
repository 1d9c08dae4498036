//! Transient notices: desktop notifications via notify-rust (D-Bus), or
//! plain console lines for the terminal screen.

use notify_rust::Notification;
use tracing::{debug, warn};

use super::NotificationService;

const NOTICE_TIMEOUT_MS: i32 = 2000;

pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl NotificationService for Notifier {
    fn notify(&self, message: &str) {
        debug!("Notice: {message}");

        if !self.enabled {
            return;
        }

        if let Err(e) = Notification::new()
            .summary("Quotify")
            .body(message)
            .icon("format-quote")
            .timeout(NOTICE_TIMEOUT_MS)
            .show()
        {
            warn!("Failed to show notification: {e}");
        }
    }
}

/// Prints notices on their own line of the terminal screen.
pub struct ConsoleNotifier;

impl NotificationService for ConsoleNotifier {
    fn notify(&self, message: &str) {
        debug!("Notice: {message}");
        println!("  » {message}");
    }
}
