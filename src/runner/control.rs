use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ControlFlags {
    paused: bool,
    cancelled: bool,
}

/// Pause/resume/cancel handle shared between an executor and its callers.
///
/// Flags are only observed at task boundaries; a running task is never
/// interrupted.
#[derive(Debug, Clone)]
pub struct ExecutionControl {
    tx: Arc<watch::Sender<ControlFlags>>,
}

impl Default for ExecutionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ControlFlags::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn pause(&self) {
        self.tx.send_modify(|f| f.paused = true);
    }

    pub fn resume(&self) {
        self.tx.send_modify(|f| f.paused = false);
    }

    /// Remaining tasks of the current (or next) run are skipped
    pub fn cancel(&self) {
        self.tx.send_modify(|f| f.cancelled = true);
    }

    pub fn is_paused(&self) -> bool {
        self.tx.borrow().paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.tx.borrow().cancelled
    }

    pub(crate) fn reset(&self) {
        self.tx.send_replace(ControlFlags::default());
    }

    /// Block until resumed or cancelled. Returns true if cancelled.
    pub(crate) async fn wait_while_paused(&self) -> bool {
        let mut rx = self.tx.subscribe();
        let cancelled = rx
            .wait_for(|f| !f.paused || f.cancelled)
            .await
            .map(|f| f.cancelled);
        // The sender lives in `self`, so the channel cannot close while we wait
        cancelled.unwrap_or(true)
    }
}
