use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::{bcs, error::GatewayResult};

/// Move module holding the output oracle.
pub const OP_OUTPUT_MODULE: &str = "op_output";

/// Address the `op_output` module is published at.
pub const STDLIB_ADDRESS: &str = "0x1";

pub const PROPOSE_L2_OUTPUT: &str = "propose_l2_output";
pub const NEXT_BLOCK_NUM: &str = "next_block_num";

pub const MSG_EXECUTE_TYPE_URL: &str = "/initia.move.v1.MsgExecute";

/// Amino JSON form of `initia.move.v1.MsgExecute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecute {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub sender: String,
    pub module_address: String,
    pub module_name: String,
    pub function_name: String,
    pub type_args: Vec<String>,
    /// Base64 of the BCS encoded arguments.
    pub args: Vec<String>,
}

impl MsgExecute {
    pub fn new(
        sender: impl Into<String>,
        module_address: impl Into<String>,
        module_name: impl Into<String>,
        function_name: impl Into<String>,
        type_args: Vec<String>,
        args: &[Vec<u8>],
    ) -> Self {
        Self {
            type_url: MSG_EXECUTE_TYPE_URL.to_string(),
            sender: sender.into(),
            module_address: module_address.into(),
            module_name: module_name.into(),
            function_name: function_name.into(),
            type_args,
            args: args.iter().map(|a| STANDARD.encode(a)).collect(),
        }
    }

    /// `0x1::op_output::propose_l2_output<rollup>(output_root, height)`.
    pub fn propose_l2_output(
        sender: &str,
        rollup_type_tag: &str,
        output_root: &[u8],
        height: u64,
    ) -> GatewayResult<Self> {
        let args = [
            bcs::encode_bytes(output_root, bcs::MAX_OUTPUT_ROOT_LEN)?,
            bcs::encode_u64(height),
        ];

        Ok(Self::new(
            sender,
            STDLIB_ADDRESS,
            OP_OUTPUT_MODULE,
            PROPOSE_L2_OUTPUT,
            vec![rollup_type_tag.to_string()],
            &args,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propose_l2_output() {
        let msg =
            MsgExecute::propose_l2_output("init1sender", "0x1::rollup::R", &[0xaa; 32], 5).unwrap();

        assert_eq!(msg.module_address, "0x1");
        assert_eq!(msg.module_name, "op_output");
        assert_eq!(msg.function_name, "propose_l2_output");
        assert_eq!(msg.type_args, vec!["0x1::rollup::R".to_string()]);

        let mut expected_root = vec![32u8];
        expected_root.extend_from_slice(&[0xaa; 32]);
        assert_eq!(STANDARD.decode(&msg.args[0]).unwrap(), expected_root);
        assert_eq!(msg.args[1], "BQAAAAAAAAA=");
    }

    #[test]
    fn test_msg_json_type_url() {
        let msg = MsgExecute::propose_l2_output("init1sender", "0x1::rollup::R", &[1], 1).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["@type"], "/initia.move.v1.MsgExecute");
        assert_eq!(json["sender"], "init1sender");
    }

    #[test]
    fn test_propose_rejects_long_root() {
        assert!(MsgExecute::propose_l2_output("s", "t", &[0; 34], 1).is_err());
    }
}
