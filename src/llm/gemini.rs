//! Gemini completion provider implementation.
//!
//! Implements `CompletionProvider` for the Gemini `generateContent` API:
//! POST {base}/v1beta/models/{model}:generateContent
//!
//! Wire-format notes:
//! - every turn is a `Content` with a role and an array of parts
//! - a part is text, a `functionCall` (model asking for a tool), or a
//!   `functionResponse` (tool result fed back on the `function` role)
//! - tool declarations ride in `tools[].functionDeclarations`
//! - the generated reply is the first candidate's parts

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CompletionProvider;
use crate::types::{CompletionRequest, CompletionResponse, ToolCall, TurnRole};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Per-call timeout; a completion can be slow but must not hang forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini API client.
pub struct GeminiProvider {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

// --- API request types ---
// These match the generateContent wire format.

#[derive(Serialize)]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiToolGroup>>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ApiContent {
    role: String,
    parts: Vec<ApiPart>,
}

/// One part of a content entry; exactly one field is set.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug)]
struct ApiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolGroup {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Serialize)]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// --- API response types ---

#[derive(Deserialize, Debug)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Deserialize, Debug)]
struct ApiCandidate {
    content: Option<ApiContentResponse>,
}

#[derive(Deserialize, Debug)]
struct ApiContentResponse {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

// --- Implementation ---

impl GeminiProvider {
    pub fn new(api_key: String, api_base: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for Gemini")?;

        Ok(Self {
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client,
        })
    }

    /// Convert the internal turn sequence to the Gemini wire format.
    fn build_api_request(request: &CompletionRequest) -> ApiRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                    TurnRole::Function => "function",
                };

                let part = if let Some(call) = &turn.tool_call {
                    ApiPart {
                        function_call: Some(ApiFunctionCall {
                            name: call.name.clone(),
                            args: call.args.clone(),
                        }),
                        ..Default::default()
                    }
                } else if let Some(result) = &turn.tool_result {
                    ApiPart {
                        function_response: Some(ApiFunctionResponse {
                            name: result.name.clone(),
                            response: serde_json::json!({ "content": result.content }),
                        }),
                        ..Default::default()
                    }
                } else {
                    ApiPart {
                        text: Some(turn.text.clone()),
                        ..Default::default()
                    }
                };

                ApiContent {
                    role: role.to_string(),
                    parts: vec![part],
                }
            })
            .collect();

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(vec![ApiToolGroup {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|t| ApiFunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    })
                    .collect(),
            }])
        };

        ApiRequest { contents, tools }
    }

    /// Flatten the first candidate into text plus ordered tool calls.
    fn parse_response(api_response: ApiResponse) -> CompletionResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        let parts = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    name: call.name,
                    args: call.args,
                });
            }
        }

        CompletionResponse { text, tool_calls }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let api_request = Self::build_api_request(request);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            request.model
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_body);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        Ok(Self::parse_response(api_response))
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
