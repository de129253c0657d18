//! Collection of generic internal data types and digest routines shared by the
//! output submitter crates.

pub mod buf;
pub mod denom;
pub mod errors;
pub mod hash;
pub mod output;

pub use errors::{CommitmentError, ErrorKind};
