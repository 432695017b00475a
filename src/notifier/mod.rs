//! Desktop notifications. [Notifier] is what the rest of the program talks to, the actual
//! platform call sits behind [NotificationBackend] so it can be replaced in tests.

use anyhow::Result;
use tracing::{error, info};

use crate::utils::{clock::Clock, time::format_clock};

pub const APP_NAME: &str = "Water Reminder";
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 10;
const SOUND_NAME: &str = "message-new-instant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub timeout_seconds: u32,
    pub sound: bool,
}

/// Intended to serve as a contract for anything able to display a notification.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationBackend {
    fn show(&self, request: &NotificationRequest) -> Result<()>;
}

/// Shows notifications through the notification service of the host.
pub struct DesktopBackend;

impl NotificationBackend for DesktopBackend {
    fn show(&self, request: &NotificationRequest) -> Result<()> {
        let mut notification = notify_rust::Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&request.title)
            .body(&request.message)
            .timeout(notify_rust::Timeout::Milliseconds(
                request.timeout_seconds.saturating_mul(1000),
            ));
        if request.sound {
            notification.sound_name(SOUND_NAME);
        }
        notification.show().map(|_| ())?;
        Ok(())
    }
}

pub struct Notifier<B> {
    backend: B,
    clock: Box<dyn Clock>,
}

impl<B: NotificationBackend> Notifier<B> {
    pub fn new(backend: B, clock: Box<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Shows a notification and reports whether it worked. Failures are logged and printed, never
    /// returned.
    pub fn send(&self, title: &str, message: &str, timeout_seconds: u32, sound: bool) -> bool {
        let request = NotificationRequest {
            title: title.into(),
            message: message.into(),
            timeout_seconds,
            sound,
        };
        match self.backend.show(&request) {
            Ok(()) => {
                let at = format_clock(self.clock.now());
                info!("Notification sent at {at}");
                println!("Notification sent at {at}");
                true
            }
            Err(e) => {
                error!("Error sending notification {e:?}");
                println!("Error sending notification: {e}");
                false
            }
        }
    }
}

/// Checks that the host can show notifications at all. Only freedesktop systems can be asked,
/// elsewhere the facility is part of the OS.
pub fn ensure_notification_facility() -> Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(all(unix, not(target_os = "macos")))] {
            probe_notification_server()
        } else {
            Ok(())
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn probe_notification_server() -> Result<()> {
    use anyhow::anyhow;

    let server = notify_rust::get_server_information().map_err(|e| {
        anyhow!(
            "No notification service found ({e}). Install and start a notification daemon such \
             as dunst, mako or the one shipped with your desktop environment."
        )
    })?;
    info!("Using notification server {} {}", server.name, server.version);
    Ok(())
}
