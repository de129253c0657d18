//! The output submission loop: polls L1 for the next expected L2 height,
//! fetches that output from the executor and proposes it on L1.

pub mod error;
pub mod handle;
pub mod state;
pub mod submitter;

pub use error::SubmitterError;
pub use handle::SubmitterHandle;
pub use state::{SubmitterPhase, SubmitterState, SubmitterStatus};
pub use submitter::{Iteration, OutputSubmitter};
