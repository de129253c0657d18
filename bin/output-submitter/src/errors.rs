use std::io;

use format_serde_error::SerdeError;
use opinit_executor_client::ExecutorError;
use opinit_l1client::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("config: {0}")]
    MalformedConfig(#[from] SerdeError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("executor client: {0}")]
    ExecutorClient(#[from] ExecutorError),

    #[error("l1 client: {0}")]
    L1Client(#[from] GatewayError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing key in table.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Key exists but cannot be traversed.
    #[error("can't traverse into non-table key: {0}")]
    TraverseNonTableAt(String),

    /// Invalid override string.
    #[error("Invalid override: '{0}'")]
    InvalidOverride(String),

    #[error("config root is not a table")]
    NotATable,
}
