//! Status reporter that records every message.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::status::StatusReporter;

/// Keeps every reported message, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Waits until at least `count` messages arrived.
    ///
    /// Log forwarding runs on its own task, so messages can land after the
    /// call that caused them returns.
    pub async fn wait_for_count(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.messages().len() >= count {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(5)).await;
        }
    }

    /// Waits for the first message and returns it.
    pub async fn wait_for_message(&self, timeout: Duration) -> Option<String> {
        if self.wait_for_count(1, timeout).await {
            self.messages().into_iter().next()
        } else {
            None
        }
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}
