use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Hash of a broadcast L1 transaction, as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Proof that a transaction made it into an L1 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionRecord {
    pub txid: TxId,
    pub height: u64,
    pub gas_used: u64,
}

/// Body of `POST /initia/move/v1/view`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRequest {
    pub address: String,
    pub module_name: String,
    pub function_name: String,
    pub type_args: Vec<String>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewResponse {
    /// JSON encoded return value of the view function.
    pub data: String,
}

/// Body of `POST /cosmos/tx/v1beta1/txs`.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastRequest {
    /// Base64 encoded signed tx.
    pub tx_bytes: String,
    pub mode: &'static str,
}

pub const BROADCAST_MODE_SYNC: &str = "BROADCAST_MODE_SYNC";

/// Wrapper the LCD puts around tx results.
#[derive(Debug, Clone, Deserialize)]
pub struct TxResponseEnvelope {
    pub tx_response: TxResponse,
}

/// Result of a tx, either from CheckTx at broadcast or from its block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxResponse {
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub height: u64,
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub gas_used: u64,
}

/// A u64 the node may render either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum U64Repr {
    Num(u64),
    Str(String),
}

impl U64Repr {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            U64Repr::Num(n) => Ok(n),
            U64Repr::Str(s) => s.parse().map_err(|_| format!("not an integer: {s:?}")),
        }
    }
}

fn deserialize_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    U64Repr::deserialize(d)?.into_u64().map_err(de::Error::custom)
}

/// Parses the `data` of a view call returning a `u64`.
pub fn parse_u64_data(data: &str) -> Result<u64, String> {
    serde_json::from_str::<U64Repr>(data)
        .map_err(|e| e.to_string())?
        .into_u64()
}
