//! Common wrappers around the hash functions the rollup commits with.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use digest::Digest;
use sha2::Sha256;
use sha3::Sha3_256;

use crate::{buf::Buf32, errors::CommitmentError};

/// Standard alphabet, padding optional on decode.
const BLOCK_HASH_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Direct untagged SHA3-256 (FIPS-202 padding, not legacy keccak).
pub fn sha3_256(buf: &[u8]) -> Buf32 {
    Buf32::from(<[u8; 32]>::from(Sha3_256::digest(buf)))
}

/// Direct untagged SHA-256.
pub fn sha256(buf: &[u8]) -> Buf32 {
    Buf32::from(<[u8; 32]>::from(Sha256::digest(buf)))
}

/// Computes the output root committed to L1 for an L2 block.
///
/// The preimage is `ascii(version) || hex(state_root) || hex(storage_root) ||
/// base64(latest_block_hash)`. Verifiers on L1 reproduce exactly this
/// concatenation, so none of it may change.
pub fn compute_output_root(
    version: u64,
    state_root: &str,
    storage_root: &str,
    latest_block_hash: &str,
) -> Result<Buf32, CommitmentError> {
    let state_root = decode_hex("state_root", state_root)?;
    let storage_root = decode_hex("storage_root", storage_root)?;
    let latest_block_hash = BLOCK_HASH_B64
        .decode(latest_block_hash)
        .map_err(|source| CommitmentError::InvalidBase64 {
            field: "latest_block_hash",
            source,
        })?;

    let mut hasher = Sha3_256::new();
    hasher.update(version.to_string().as_bytes());
    hasher.update(&state_root);
    hasher.update(&storage_root);
    hasher.update(&latest_block_hash);

    Ok(Buf32::from(<[u8; 32]>::from(hasher.finalize())))
}

/// Same as [`compute_output_root`], hex encoded.
pub fn create_output_root(
    version: u64,
    state_root: &str,
    storage_root: &str,
    latest_block_hash: &str,
) -> Result<String, CommitmentError> {
    compute_output_root(version, state_root, storage_root, latest_block_hash).map(|r| r.to_hex())
}

fn decode_hex(field: &'static str, s: &str) -> Result<Vec<u8>, CommitmentError> {
    hex::decode(s).map_err(|source| CommitmentError::InvalidHex { field, source })
}
