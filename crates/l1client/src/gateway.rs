use std::time::Duration;

use async_trait::async_trait;
use tracing::*;

use crate::{
    error::{GatewayError, GatewayResult},
    inclusion::wait_for_inclusion,
    msg::{MsgExecute, NEXT_BLOCK_NUM, OP_OUTPUT_MODULE, STDLIB_ADDRESS},
    traits::{ChainGateway, L1Client, TxSigner},
    types::{parse_u64_data, InclusionRecord, TxId, ViewRequest},
};

/// [`ChainGateway`] over an L1 node and a signer, scoped to one rollup.
#[derive(Debug)]
pub struct L1Gateway<C, S> {
    client: C,
    signer: S,
    /// Move type tag identifying the rollup in `op_output`.
    rollup_type_tag: String,
    inclusion_poll_interval: Duration,
}

impl<C: L1Client, S: TxSigner> L1Gateway<C, S> {
    pub fn new(
        client: C,
        signer: S,
        rollup_type_tag: impl Into<String>,
        inclusion_poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            signer,
            rollup_type_tag: rollup_type_tag.into(),
            inclusion_poll_interval,
        }
    }

    pub fn rollup_type_tag(&self) -> &str {
        &self.rollup_type_tag
    }
}

#[async_trait]
impl<C: L1Client, S: TxSigner> ChainGateway for L1Gateway<C, S> {
    async fn next_expected_height(&self) -> GatewayResult<u64> {
        let req = ViewRequest {
            address: STDLIB_ADDRESS.to_string(),
            module_name: OP_OUTPUT_MODULE.to_string(),
            function_name: NEXT_BLOCK_NUM.to_string(),
            type_args: vec![self.rollup_type_tag.clone()],
            args: vec![],
        };

        let data = self.client.view_function(&req).await?;
        parse_u64_data(&data).map_err(GatewayError::MalformedResponse)
    }

    async fn submit_output_proposal(
        &self,
        output_root: &[u8],
        height: u64,
    ) -> GatewayResult<TxId> {
        let msg = MsgExecute::propose_l2_output(
            self.signer.address(),
            &self.rollup_type_tag,
            output_root,
            height,
        )?;

        let tx_bytes = self.signer.sign(&[msg]).await?;
        let resp = self.client.broadcast_tx(&tx_bytes).await?;

        let txid = TxId::from(resp.txhash);
        debug!(%height, %txid, "broadcast output proposal");
        Ok(txid)
    }

    async fn await_inclusion(
        &self,
        txid: &TxId,
        timeout: Duration,
    ) -> GatewayResult<InclusionRecord> {
        wait_for_inclusion(&self.client, txid, timeout, self.inclusion_poll_interval).await
    }
}
