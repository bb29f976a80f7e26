//! User-facing alerts.

use std::sync::Mutex;

/// Shows blocking alert messages to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier that keeps every alert in memory, for headless use.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts shown so far, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        match self.alerts.lock() {
            Ok(alerts) => alerts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        tracing::debug!("Alert: {}", message);
        match self.alerts.lock() {
            Ok(mut alerts) => alerts.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
