//! Completion provider module.
//!
//! Defines the `CompletionProvider` trait that abstracts over the remote
//! language-model service, plus the concrete Gemini implementation.
//!
//! The trait exists so the orchestrator can be driven by a scripted fake in
//! tests: the rest of the code never sees the provider's wire format, only
//! `CompletionRequest` / `CompletionResponse`.

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CompletionRequest, CompletionResponse};

/// Trait the remote completion service is accessed through.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion call and wait for the full response.
    ///
    /// Any failure here (transport, non-success status, unparsable body)
    /// is fatal to the chat request; there is no retry.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// The provider's display name, for logging.
    fn name(&self) -> &str;
}
