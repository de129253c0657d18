//! The subset of BCS needed for Move entry function arguments.

use crate::error::{GatewayError, GatewayResult};

/// Longest output root `propose_l2_output` accepts.
pub const MAX_OUTPUT_ROOT_LEN: usize = 33;

fn write_uleb128(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Encodes a `vector<u8>`, rejecting inputs longer than `max_len`.
pub fn encode_bytes(bytes: &[u8], max_len: usize) -> GatewayResult<Vec<u8>> {
    if bytes.len() > max_len {
        return Err(GatewayError::InvalidArgument(format!(
            "vector<u8> of length {} exceeds max {max_len}",
            bytes.len()
        )));
    }

    let mut out = Vec::with_capacity(bytes.len() + 1);
    write_uleb128(&mut out, bytes.len() as u64);
    out.extend_from_slice(bytes);
    Ok(out)
}

pub fn encode_u64(v: u64) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}
