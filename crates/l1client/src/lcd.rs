use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use opinit_config::L1Config;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::*;

use crate::{
    error::{GatewayError, GatewayResult},
    traits::L1Client,
    types::{
        BroadcastRequest, TxId, TxResponse, TxResponseEnvelope, ViewRequest, ViewResponse,
        BROADCAST_MODE_SYNC,
    },
};

/// gRPC status code the gateway reports for unknown txs.
const GRPC_NOT_FOUND: i32 = 5;

/// Error body of the LCD's grpc-gateway.
#[derive(Debug, Deserialize)]
struct LcdErrorBody {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// An `async` client for the L1 LCD (REST) endpoint.
#[derive(Debug, Clone)]
pub struct LcdClient {
    /// Base url, without trailing slash.
    url: String,
    client: Client,
}

impl LcdClient {
    pub fn new(config: &L1Config) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Builder(e.to_string()))?;

        let url = config.lcd_url.trim_end_matches('/').to_string();
        trace!(%url, "Created LCD client");

        Ok(Self { url, client })
    }

    async fn read_body(resp: reqwest::Response) -> GatewayResult<(StatusCode, String)> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, %body, "Response received");
        Ok((status, body))
    }
}

#[async_trait]
impl L1Client for LcdClient {
    async fn view_function(&self, req: &ViewRequest) -> GatewayResult<String> {
        let url = format!("{}/initia/move/v1/view", self.url);
        trace!(?req, "Calling view function");

        let resp = self.client.post(&url).json(req).send().await?;
        let (status, body) = Self::read_body(resp).await?;
        parse_view_response(status, &body)
    }

    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> GatewayResult<TxResponse> {
        let url = format!("{}/cosmos/tx/v1beta1/txs", self.url);
        let req = BroadcastRequest {
            tx_bytes: STANDARD.encode(tx_bytes),
            mode: BROADCAST_MODE_SYNC,
        };
        trace!(len = %tx_bytes.len(), "Broadcasting tx");

        let resp = self.client.post(&url).json(&req).send().await?;
        let (status, body) = Self::read_body(resp).await?;
        parse_broadcast_response(status, &body)
    }

    async fn get_tx(&self, txid: &TxId) -> GatewayResult<Option<TxResponse>> {
        let url = format!("{}/cosmos/tx/v1beta1/txs/{txid}", self.url);
        trace!(%txid, "Looking up tx");

        let resp = self.client.get(&url).send().await?;
        let (status, body) = Self::read_body(resp).await?;
        parse_tx_lookup(status, &body)
    }
}

fn service_error(status: StatusCode, body: &str) -> GatewayError {
    GatewayError::Service {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

fn malformed(e: serde_json::Error) -> GatewayError {
    GatewayError::MalformedResponse(e.to_string())
}

pub(crate) fn parse_view_response(status: StatusCode, body: &str) -> GatewayResult<String> {
    if !status.is_success() {
        return Err(service_error(status, body));
    }
    let resp = serde_json::from_str::<ViewResponse>(body).map_err(malformed)?;
    Ok(resp.data)
}

/// A non-zero CheckTx code means the node refused the tx.
pub(crate) fn parse_broadcast_response(status: StatusCode, body: &str) -> GatewayResult<TxResponse> {
    if !status.is_success() {
        return Err(service_error(status, body));
    }
    let resp = serde_json::from_str::<TxResponseEnvelope>(body)
        .map_err(malformed)?
        .tx_response;

    if resp.code != 0 {
        return Err(GatewayError::Rejected {
            code: resp.code,
            log: resp.raw_log,
        });
    }
    Ok(resp)
}

/// An unknown tx is not an error, it may just not be in a block yet.
pub(crate) fn parse_tx_lookup(status: StatusCode, body: &str) -> GatewayResult<Option<TxResponse>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<LcdErrorBody>(body) {
            if err.code == GRPC_NOT_FOUND || err.message.contains("not found") {
                return Ok(None);
            }
        }
        return Err(service_error(status, body));
    }

    let resp = serde_json::from_str::<TxResponseEnvelope>(body).map_err(malformed)?;
    Ok(Some(resp.tx_response))
}
