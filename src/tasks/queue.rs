use super::intent::TaskIntent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Fire-and-forget submission handle. Cloned into every manager that
/// emits deferred work.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<TaskIntent>,
}

impl TaskQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskIntent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Never blocks and never fails the caller: if the worker is gone the
    /// intent is dropped with a warning.
    pub fn submit(&self, intent: TaskIntent) {
        debug!("Submitting task {}", intent);
        if let Err(err) = self.sender.send(intent) {
            warn!("Task worker unavailable, dropping {}", err.0);
        }
    }
}
