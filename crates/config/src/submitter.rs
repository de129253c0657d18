use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the output submission loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Wait between two iterations of the loop, in ms. Applied after every
    /// iteration whatever its outcome.
    pub poll_interval_ms: u64,

    /// How long to wait for a broadcast proposal to be included, in ms.
    pub inclusion_timeout_ms: u64,

    /// How often to query the chain for the broadcast tx while waiting, in ms.
    pub inclusion_poll_interval_ms: u64,
}

impl SubmitterConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn inclusion_timeout(&self) -> Duration {
        Duration::from_millis(self.inclusion_timeout_ms)
    }

    pub fn inclusion_poll_interval(&self) -> Duration {
        Duration::from_millis(self.inclusion_poll_interval_ms)
    }
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            inclusion_timeout_ms: 60_000,
            inclusion_poll_interval_ms: 1_000,
        }
    }
}
