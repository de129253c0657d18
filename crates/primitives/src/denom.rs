//! Mapping from fully qualified Move struct tags to chain denoms.

use crate::hash::sha256;

const NATIVE_PREFIX: &str = "0x1::native_";
const IBC_PREFIX: &str = "0x1::ibc_";

/// Classifies a struct tag into the denom the bank module knows it by.
///
/// Native and IBC coins carry their symbol in the module name, everything else
/// is identified by the SHA-256 of the full tag.
pub fn struct_tag_to_denom(struct_tag: &str) -> String {
    if struct_tag.starts_with(NATIVE_PREFIX) {
        module_symbol(struct_tag).to_string()
    } else if struct_tag.starts_with(IBC_PREFIX) {
        format!("ibc/{}", module_symbol(struct_tag))
    } else {
        format!("move/{}", sha256(struct_tag.as_bytes()).to_hex())
    }
}

/// `0x1::<kind>_<symbol>[_...][::...]` -> `<symbol>`
fn module_symbol(struct_tag: &str) -> &str {
    struct_tag
        .split("::")
        .nth(1)
        .and_then(|module| module.split('_').nth(1))
        .unwrap_or_default()
}
