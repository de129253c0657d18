//! Configuration types for the output submitter, deserialized from TOML.

mod config;
pub mod submitter;

pub use config::{Config, ExecutorConfig, L1Config, SignerConfig};
pub use submitter::SubmitterConfig;
