//! Errors during parsing/handling/conversion of primitives, plus the error
//! classification shared by every crate in the workspace.

use std::fmt;

use thiserror::Error;

/// Coarse classification of a failure. The submitter decides whether to keep
/// going or stop purely on this.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The requested item does not exist (yet).
    NotFound,

    /// Malformed hex/base64 or a value that cannot be encoded.
    InvalidEncoding,

    /// Network level failure talking to a remote service.
    Transport,

    /// The remote service answered, but with an error or a malformed body.
    ServiceError,

    /// A deadline elapsed before the awaited condition held.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::Transport => "transport",
            ErrorKind::ServiceError => "service error",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Errors produced while building commitments out of encoded inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitmentError {
    #[error("invalid hex in {field}: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("invalid base64 in {field}: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}

impl CommitmentError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidEncoding
    }
}
