use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::DeviceEvent;

/// Delay before a burst of fan speed writes is confirmed as settled.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Per-device cancelable confirmation timer. A burst of fan speed writes
/// schedules repeatedly; each `schedule` aborts the pending confirmation so
/// only the last value within the window is ever delivered.
#[derive(Default, Debug)]
pub struct SettleTimer {
    handle: Option<JoinHandle<()>>,
}

impl SettleTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn schedule(&mut self, events: mpsc::Sender<DeviceEvent>, event: DeviceEvent, delay: Duration) {
        self.cancel();
        self.handle = Some(tokio::task::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = events.send(event).await {
                log::warn!("Error sending settled confirmation: {}", err)
            }
        }));
    }

    /// Return true if a pending confirmation was aborted, false if none was running
    pub fn cancel(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            return true;
        }
        false
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}
