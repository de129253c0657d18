use async_trait::async_trait;
use opinit_primitives::output::OutputRecord;

use crate::error::ExecutorResult;

/// Source of outputs computed by the executor.
#[async_trait]
pub trait ExecutorClient: Send + Sync + 'static {
    /// Fetches the output for the L2 `height`.
    ///
    /// Fails with [`ExecutorError::NotFound`](crate::ExecutorError::NotFound)
    /// if the executor has not computed it yet.
    async fn fetch_output(&self, height: u64) -> ExecutorResult<OutputRecord>;
}
