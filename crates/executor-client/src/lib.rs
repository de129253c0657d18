//! HTTP client for the rollup executor's output API.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::HttpExecutorClient;
pub use error::{ExecutorError, ExecutorResult};
pub use traits::ExecutorClient;
