use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::watch;

use crate::state::SubmitterStatus;

/// Cloneable control handle for a running [`OutputSubmitter`](crate::OutputSubmitter).
#[derive(Clone, Debug)]
pub struct SubmitterHandle {
    running: Arc<AtomicBool>,
    status_tx: Arc<watch::Sender<SubmitterStatus>>,
}

impl SubmitterHandle {
    pub(crate) fn new(initial: SubmitterStatus) -> Self {
        let running = Arc::new(AtomicBool::new(initial.running));
        let (status_tx, _) = watch::channel(initial);
        Self {
            running,
            status_tx: Arc::new(status_tx),
        }
    }

    /// Asks the loop to exit at the top of its next iteration. An in flight
    /// submission is not interrupted. Stopping is permanent and shows up in
    /// [`Self::status`] right away.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.status_tx.send_modify(|status| status.running = false);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SubmitterStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SubmitterStatus> {
        self.status_tx.subscribe()
    }

    pub(crate) fn publish(&self, mut status: SubmitterStatus) {
        status.running = self.is_running();
        self.status_tx.send_replace(status);
    }
}
