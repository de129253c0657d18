use std::fmt;

use opinit_l1client::TxId;

/// What the submitter is doing right now.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SubmitterPhase {
    Idle,
    /// Asking L1 for the next expected height.
    Polling,
    /// Fetching the output from the executor.
    Fetching,
    /// Building, signing and broadcasting the proposal.
    Submitting,
    /// Waiting for the proposal to be included.
    Confirming,
    /// Terminal.
    Stopped,
}

impl fmt::Display for SubmitterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmitterPhase::Idle => "idle",
            SubmitterPhase::Polling => "polling",
            SubmitterPhase::Fetching => "fetching",
            SubmitterPhase::Submitting => "submitting",
            SubmitterPhase::Confirming => "confirming",
            SubmitterPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// State owned by the submission loop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitterState {
    /// Highest L2 height whose output we saw included on L1. Never decreases.
    synced_height: u64,
    phase: SubmitterPhase,
    last_txid: Option<TxId>,
}

impl SubmitterState {
    pub fn new(synced_height: u64) -> Self {
        Self {
            synced_height,
            phase: SubmitterPhase::Idle,
            last_txid: None,
        }
    }

    pub fn synced_height(&self) -> u64 {
        self.synced_height
    }

    pub fn phase(&self) -> SubmitterPhase {
        self.phase
    }

    pub fn last_txid(&self) -> Option<&TxId> {
        self.last_txid.as_ref()
    }

    pub(crate) fn set_phase(&mut self, phase: SubmitterPhase) {
        // stopped is terminal
        if self.phase != SubmitterPhase::Stopped {
            self.phase = phase;
        }
    }

    /// Records a confirmed proposal for `height`.
    pub(crate) fn mark_synced(&mut self, height: u64, txid: TxId) {
        debug_assert!(height > self.synced_height, "synced height going backwards");
        self.synced_height = self.synced_height.max(height);
        self.last_txid = Some(txid);
    }

    pub(crate) fn status(&self, running: bool) -> SubmitterStatus {
        SubmitterStatus {
            phase: self.phase,
            synced_height: self.synced_height,
            running,
            last_txid: self.last_txid.clone(),
        }
    }
}

impl Default for SubmitterState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Snapshot of the submitter published to observers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitterStatus {
    pub phase: SubmitterPhase,
    pub synced_height: u64,
    pub running: bool,
    pub last_txid: Option<TxId>,
}
