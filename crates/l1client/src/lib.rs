//! L1 side of the output submitter: view queries, proposal transactions and
//! inclusion tracking against an Initia L1 over its LCD REST API.

pub mod bcs;
pub mod error;
pub mod gateway;
pub mod inclusion;
pub mod lcd;
pub mod msg;
pub mod signer;
pub mod traits;
pub mod types;

pub use error::{GatewayError, GatewayResult};
pub use gateway::L1Gateway;
pub use lcd::LcdClient;
pub use signer::RemoteSigner;
pub use traits::{ChainGateway, L1Client, TxSigner};
pub use types::{InclusionRecord, TxId};
