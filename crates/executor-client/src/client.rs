use async_trait::async_trait;
use opinit_config::ExecutorConfig;
use opinit_primitives::output::OutputRecord;
use reqwest::{Client, StatusCode};
use tracing::*;

use crate::{
    error::{ExecutorError, ExecutorResult},
    traits::ExecutorClient,
    types::{ErrorBody, GetOutputResponse},
};

/// An `async` client for the executor's REST API.
#[derive(Debug, Clone)]
pub struct HttpExecutorClient {
    /// Base url of the executor, without trailing slash.
    url: String,
    client: Client,
}

impl HttpExecutorClient {
    pub fn new(config: &ExecutorConfig) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ExecutorError::Builder(e.to_string()))?;

        let url = config.url.trim_end_matches('/').to_string();
        trace!(%url, "Created executor client");

        Ok(Self { url, client })
    }

    fn output_url(&self, height: u64) -> String {
        format!("{}/output/height/{height}", self.url)
    }
}

#[async_trait]
impl ExecutorClient for HttpExecutorClient {
    async fn fetch_output(&self, height: u64) -> ExecutorResult<OutputRecord> {
        let url = self.output_url(height);
        trace!(%url, %height, "Fetching output");

        let resp = self.client.get(&url).send().await.map_err(|err| {
            warn!(%err, %height, "Error calling executor");
            ExecutorError::Transport(err.to_string())
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| ExecutorError::Transport(err.to_string()))?;
        trace!(%status, %body, "Response received");

        parse_output_response(height, status, &body)
    }
}

/// Interprets an executor answer for `height`.
///
/// A `NOT_FOUND_ERROR` body means not found whatever the status code is.
pub fn parse_output_response(
    height: u64,
    status: StatusCode,
    body: &str,
) -> ExecutorResult<OutputRecord> {
    if let Ok(err_body) = serde_json::from_str::<ErrorBody>(body) {
        if err_body.is_not_found() {
            return Err(ExecutorError::NotFound { height });
        }
    }

    if !status.is_success() {
        return Err(ExecutorError::Service {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let resp = serde_json::from_str::<GetOutputResponse>(body)
        .map_err(|e| ExecutorError::MalformedResponse(e.to_string()))?;

    // never propose a root for a height it doesn't commit to
    if resp.output.block_height != height {
        warn!(requested = %height, got = %resp.output.block_height, "executor returned output for another height");
        return Err(ExecutorError::MalformedResponse(format!(
            "asked for height {height}, got output for {}",
            resp.output.block_height
        )));
    }

    Ok(resp.output)
}
