use opinit_primitives::output::OutputRecord;
use serde::Deserialize;

/// Error type tag the executor uses for missing outputs.
pub const NOT_FOUND_ERROR: &str = "NOT_FOUND_ERROR";

/// Successful response of `GET /output/height/{height}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetOutputResponse {
    pub output: OutputRecord,
}

/// Error body returned by the executor.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn is_not_found(&self) -> bool {
        self.error_type.as_deref() == Some(NOT_FOUND_ERROR)
    }
}
