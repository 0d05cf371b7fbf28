use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Receives user-facing status messages.
///
/// Implementations display the latest message only; there is no history and
/// no ordering beyond arrival order.
pub trait StatusReporter: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> StatusReporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// A status message with the time it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

/// Last-write-wins status slot.
#[derive(Debug, Clone)]
pub struct LatestStatus {
    tx: Arc<watch::Sender<Option<StatusUpdate>>>,
}

impl LatestStatus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// The most recent message, if any arrived yet.
    pub fn latest(&self) -> Option<StatusUpdate> {
        self.tx.borrow().clone()
    }

    /// Watches for new messages.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusUpdate>> {
        self.tx.subscribe()
    }
}

impl Default for LatestStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for LatestStatus {
    fn report(&self, message: &str) {
        // send_replace works with no receivers
        self.tx.send_replace(Some(StatusUpdate {
            message: message.to_string(),
            updated_at: Utc::now(),
        }));
    }
}

/// Writes every status message to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, message: &str) {
        info!(target: "audex::status", "{}", message);
    }
}

/// Forwards each message to several reporters, in order.
#[derive(Clone, Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn StatusReporter>>,
}

impl FanoutReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl StatusReporter for FanoutReporter {
    fn report(&self, message: &str) {
        for reporter in &self.reporters {
            reporter.report(message);
        }
    }
}
