use opinit_primitives::ErrorKind;
use thiserror::Error;

pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The executor has no output for this height yet.
    #[error("output for height {height} not found")]
    NotFound { height: u64 },

    /// Could not reach the executor or read its answer.
    #[error("transport: {0}")]
    Transport(String),

    /// The executor answered with an error status.
    #[error("executor returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("could not build client: {0}")]
    Builder(String),
}

impl ExecutorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutorError::NotFound { .. } => ErrorKind::NotFound,
            ExecutorError::Transport(_) | ExecutorError::Builder(_) => ErrorKind::Transport,
            ExecutorError::Service { .. } | ExecutorError::MalformedResponse(_) => {
                ErrorKind::ServiceError
            }
        }
    }
}
