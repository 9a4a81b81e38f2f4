//! Error taxonomy for the chat pipeline.
//!
//! Two kinds of failure cross component boundaries here and they are kept
//! deliberately distinct:
//!
//! - `ChatError` aborts the whole request. The server layer maps it to an
//!   HTTP status: validation problems get a 400 with the descriptive
//!   message, everything else a 500 with a generic message.
//! - `ForecastError` never aborts a request. The weather tool serializes it
//!   into the tool-result payload so the model can explain the failure to
//!   the user in the final answer.

use thiserror::Error;

/// Request-fatal errors surfaced to the client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed client input or an invalid tool-invocation request
    /// (unknown role, unregistered tool name, missing arguments).
    #[error("{0}")]
    Validation(String),

    /// The completion provider call failed: transport error, non-success
    /// status, or an unusable response body. Never retried.
    #[error("completion provider request failed: {0}")]
    UpstreamModel(String),

    /// Anything unexpected. Logged server-side, reported opaquely.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failures of the forecast provider lookup.
///
/// These are data, not exceptions: the weather tool converts them into an
/// `{"error": ...}` payload before they reach the orchestrator.
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    /// The point lookup returned 404: the coordinates fall outside the
    /// forecast provider's covered region.
    #[error("Location not found. The forecast service only supports locations within the US.")]
    LocationUnsupported,

    /// Any other forecast-provider failure: bad status, missing field.
    #[error("forecast service error: {0}")]
    Upstream(String),
}
