use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::GatewayResult,
    msg::MsgExecute,
    types::{InclusionRecord, TxId, TxResponse, ViewRequest},
};

/// What the output submitter needs from the L1 chain.
#[async_trait]
pub trait ChainGateway: Send + Sync + 'static {
    /// Next L2 height the output oracle expects a proposal for.
    async fn next_expected_height(&self) -> GatewayResult<u64>;

    /// Signs and broadcasts a proposal of `output_root` for `height`.
    ///
    /// Returns as soon as the node accepted the tx into its mempool.
    async fn submit_output_proposal(&self, output_root: &[u8], height: u64)
        -> GatewayResult<TxId>;

    /// Polls until `txid` is included in a block or `timeout` elapses.
    async fn await_inclusion(&self, txid: &TxId, timeout: Duration)
        -> GatewayResult<InclusionRecord>;
}

/// Raw access to an L1 node.
#[async_trait]
pub trait L1Client: Send + Sync + 'static {
    /// Calls a Move view function, returning its JSON encoded result.
    async fn view_function(&self, req: &ViewRequest) -> GatewayResult<String>;

    /// Broadcasts a signed tx in sync mode.
    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> GatewayResult<TxResponse>;

    /// Looks up a tx by hash. `None` if the node does not know about it (yet).
    async fn get_tx(&self, txid: &TxId) -> GatewayResult<Option<TxResponse>>;
}

/// Something that can produce signed txs for the submitter account.
#[async_trait]
pub trait TxSigner: Send + Sync + 'static {
    /// Bech32 address txs are signed for.
    fn address(&self) -> &str;

    /// Wraps `msgs` into a signed tx, returning its raw bytes.
    async fn sign(&self, msgs: &[MsgExecute]) -> GatewayResult<Vec<u8>>;
}
