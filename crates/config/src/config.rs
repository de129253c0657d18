use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::submitter::SubmitterConfig;

/// Default value for `request_timeout_ms` of the HTTP clients.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// L1 chain endpoint and the rollup this instance submits for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct L1Config {
    /// Base url of the L1 LCD (REST) endpoint.
    pub lcd_url: String,

    /// Move type tag identifying the rollup in the `op_output` module.
    pub rollup_type_tag: String,

    /// Bech32 address of the account proposing outputs. Must match the key
    /// held by the signer.
    pub submitter_address: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl L1Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// External signing service holding the submitter key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerConfig {
    pub url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SignerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Executor service the outputs are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ExecutorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub l1: L1Config,
    pub signer: SignerConfig,
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub submitter: SubmitterConfig,
}
