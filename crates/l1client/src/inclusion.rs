use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::*;

use crate::{
    error::{GatewayError, GatewayResult},
    traits::L1Client,
    types::{InclusionRecord, TxId},
};

/// Polls `client` every `poll_interval` until `txid` shows up in a block.
///
/// Fails with [`GatewayError::Timeout`] once `timeout` elapses, and with
/// [`GatewayError::TxFailed`] if the tx was included but did not execute.
pub async fn wait_for_inclusion<C: L1Client + ?Sized>(
    client: &C,
    txid: &TxId,
    timeout: Duration,
    poll_interval: Duration,
) -> GatewayResult<InclusionRecord> {
    let poll = poll_until_included(client, txid, poll_interval);

    match time::timeout(timeout, poll).await {
        Ok(res) => res,
        Err(_) => Err(GatewayError::Timeout {
            txid: txid.clone(),
            waited: timeout,
        }),
    }
}

async fn poll_until_included<C: L1Client + ?Sized>(
    client: &C,
    txid: &TxId,
    poll_interval: Duration,
) -> GatewayResult<InclusionRecord> {
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(resp) = client.get_tx(txid).await? else {
            trace!(%txid, "tx not included yet");
            continue;
        };

        if resp.code != 0 {
            return Err(GatewayError::TxFailed {
                txid: txid.clone(),
                code: resp.code,
                log: resp.raw_log,
            });
        }

        return Ok(InclusionRecord {
            txid: txid.clone(),
            height: resp.height,
            gas_used: resp.gas_used,
        });
    }
}
