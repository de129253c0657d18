use opinit_executor_client::ExecutorError;
use opinit_l1client::GatewayError;
use opinit_primitives::{CommitmentError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SubmitterError {
    #[error("executor: {0}")]
    Executor(#[from] ExecutorError),

    #[error("l1: {0}")]
    Gateway(#[from] GatewayError),

    #[error("output root: {0}")]
    Commitment(#[from] CommitmentError),
}

impl SubmitterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitterError::Executor(e) => e.kind(),
            SubmitterError::Gateway(e) => e.kind(),
            SubmitterError::Commitment(e) => e.kind(),
        }
    }

    /// Only a missing output is worth waiting out, anything else stops the
    /// submitter.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
