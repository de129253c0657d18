use std::time::Duration;

use opinit_primitives::ErrorKind;
use thiserror::Error;

use crate::types::TxId;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Could not reach the node or read its answer.
    #[error("transport: {0}")]
    Transport(String),

    /// The node answered with an error status.
    #[error("node returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The tx was rejected by CheckTx during broadcast.
    #[error("tx rejected on broadcast (code {code}): {log}")]
    Rejected { code: u32, log: String },

    /// The tx was included in a block but its execution failed.
    #[error("tx {txid} failed (code {code}): {log}")]
    TxFailed { txid: TxId, code: u32, log: String },

    #[error("tx {txid} not included after {waited:?}")]
    Timeout { txid: TxId, waited: Duration },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("signer: {0}")]
    Signer(String),

    #[error("could not build client: {0}")]
    Builder(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Transport(_) | GatewayError::Builder(_) => ErrorKind::Transport,
            GatewayError::Service { .. }
            | GatewayError::MalformedResponse(_)
            | GatewayError::Rejected { .. }
            | GatewayError::TxFailed { .. }
            | GatewayError::Signer(_) => ErrorKind::ServiceError,
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::InvalidArgument(_) => ErrorKind::InvalidEncoding,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            GatewayError::Builder(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
