use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use opinit_config::SignerConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{
    error::{GatewayError, GatewayResult},
    msg::MsgExecute,
    traits::TxSigner,
};

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    msgs: &'a [MsgExecute],
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    /// Base64 of the signed tx.
    tx_bytes: String,
}

/// Delegates signing to an external service that holds the submitter key.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    url: String,
    address: String,
    client: Client,
}

impl RemoteSigner {
    pub fn new(config: &SignerConfig, address: impl Into<String>) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Builder(e.to_string()))?;

        let url = config.url.trim_end_matches('/').to_string();
        let address = address.into();
        trace!(%url, %address, "Created remote signer");

        Ok(Self {
            url,
            address,
            client,
        })
    }
}

#[async_trait]
impl TxSigner for RemoteSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, msgs: &[MsgExecute]) -> GatewayResult<Vec<u8>> {
        let url = format!("{}/sign", self.url);
        trace!(n_msgs = %msgs.len(), "Requesting signature");

        let resp = self
            .client
            .post(&url)
            .json(&SignRequest { msgs })
            .send()
            .await
            .map_err(|e| GatewayError::Signer(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Signer(e.to_string()))?;

        parse_sign_response(status, &body)
    }
}

fn parse_sign_response(status: StatusCode, body: &str) -> GatewayResult<Vec<u8>> {
    if !status.is_success() {
        return Err(GatewayError::Signer(format!("status {status}: {body}")));
    }

    let resp = serde_json::from_str::<SignResponse>(body)
        .map_err(|e| GatewayError::Signer(format!("malformed response: {e}")))?;

    STANDARD
        .decode(resp.tx_bytes)
        .map_err(|e| GatewayError::Signer(format!("tx_bytes not base64: {e}")))
}
