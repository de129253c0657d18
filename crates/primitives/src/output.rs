//! L2 output types exchanged between the executor and the submitter.

use serde::{Deserialize, Serialize};

use crate::{buf::Buf32, errors::CommitmentError, hash};

/// An output the executor has computed for some L2 height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// Hex encoded output root.
    pub output_root: String,

    /// L2 height the output commits to.
    pub block_height: u64,

    /// Index of the output on L1, when the executor reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_index: Option<u64>,
}

impl OutputRecord {
    pub fn new(output_root: impl Into<String>, block_height: u64) -> Self {
        Self {
            output_root: output_root.into(),
            block_height,
            output_index: None,
        }
    }

    /// Raw bytes of the output root, as proposed on L1.
    pub fn output_root_bytes(&self) -> Result<Vec<u8>, CommitmentError> {
        hex::decode(&self.output_root).map_err(|source| CommitmentError::InvalidHex {
            field: "output_root",
            source,
        })
    }
}

/// Inputs to the output root commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRootInputs {
    pub version: u64,

    /// Hex encoded.
    pub state_root: String,

    /// Hex encoded.
    pub storage_root: String,

    /// Base64 encoded.
    pub latest_block_hash: String,
}

impl OutputRootInputs {
    pub fn output_root(&self) -> Result<Buf32, CommitmentError> {
        hash::compute_output_root(
            self.version,
            &self.state_root,
            &self.storage_root,
            &self.latest_block_hash,
        )
    }
}
