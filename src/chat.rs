//! Completion orchestrator - the core of the chat backend.
//!
//! The ChatService drives one request through the tool-calling cycle:
//!
//! ```text
//! Client turns
//!     |
//!     v
//! +-------+     +-------------+     +-------+
//! | Model |<--->| ChatService |<--->| Tools |
//! +-------+     +-------------+     +-------+
//!     |                |
//!     v                v
//! Final text      Tool results
//! ```
//!
//! The first completion call carries the tool declarations. If the model
//! requests a tool, the service dispatches it, appends the request and its
//! result to the turn sequence, and calls the model again. Declarations
//! are withheld once the round cap is reached, so the final call always
//! yields text. Per-request state lives on the stack; the service itself
//! is immutable and shared across requests.

use tracing::{info, warn};

use crate::error::ChatError;
use crate::history;
use crate::llm::CompletionProvider;
use crate::tools::ToolRouter;
use crate::types::{ChatMessage, CompletionRequest, Turn};

/// Shown when the model returns an empty reply with no tool involved.
const EMPTY_REPLY_FALLBACK: &str = "No response.";
/// Shown when the model returns an empty reply after a tool ran.
const EMPTY_SUMMARY_FALLBACK: &str = "Processed the tool result but got no summary.";

/// What the orchestrator hands to the response layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub text: String,
    pub tool_used: bool,
}

/// Drives the completion calls and tool dispatch for chat requests.
pub struct ChatService {
    llm: Box<dyn CompletionProvider>,
    tools: ToolRouter,
    model: String,
    max_tool_rounds: u32,
}

impl ChatService {
    pub fn new(
        llm: Box<dyn CompletionProvider>,
        tools: ToolRouter,
        model: impl Into<String>,
        max_tool_rounds: u32,
    ) -> Self {
        Self {
            llm,
            tools,
            model: model.into(),
            max_tool_rounds,
        }
    }

    /// Process one chat request through the tool-calling cycle.
    ///
    /// 1. Translate the client history (validation failures abort here)
    /// 2. Call the model, with tool declarations while rounds remain
    /// 3. If the model requests a tool: dispatch it, record the request
    ///    and result as turns, and go back to 2
    /// 4. Return the model's text once no tool is requested
    ///
    /// Completion-provider failures at any round abort the request; tool
    /// upstream failures do not - they ride back to the model as data.
    pub async fn handle(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<ChatOutcome, ChatError> {
        let mut turns = history::translate(history, message)?;
        let mut rounds = 0u32;

        loop {
            let offering_tools = rounds < self.max_tool_rounds && !self.tools.is_empty();
            let request = CompletionRequest {
                model: self.model.clone(),
                turns: turns.clone(),
                tools: if offering_tools {
                    self.tools.definitions()
                } else {
                    Vec::new()
                },
            };

            let response = self
                .llm
                .complete(&request)
                .await
                .map_err(|e| ChatError::UpstreamModel(format!("{e:#}")))?;

            let mut calls = response.tool_calls;
            if calls.is_empty() || !offering_tools {
                let tool_used = rounds > 0;
                let text = if response.text.is_empty() {
                    let fallback = if tool_used {
                        EMPTY_SUMMARY_FALLBACK
                    } else {
                        EMPTY_REPLY_FALLBACK
                    };
                    fallback.to_string()
                } else {
                    response.text
                };
                return Ok(ChatOutcome { text, tool_used });
            }

            // Only the first candidate is honored per round.
            if calls.len() > 1 {
                warn!(
                    ignored = calls.len() - 1,
                    "model returned multiple tool calls; honoring only the first"
                );
            }
            let call = calls.swap_remove(0);
            info!(tool = %call.name, "executing tool");

            let name = call.name.clone();
            let result = self.tools.execute(&name, &call.args).await?;

            turns.push(Turn::tool_call(call));
            turns.push(Turn::tool_result(name, result));
            rounds += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use crate::types::{CompletionResponse, ToolCall, TurnRole};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Provider that replays a script and records every request it saw.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<CompletionResponse>>>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        fn new(
            responses: Vec<Result<CompletionResponse>>,
        ) -> (Self, Arc<Mutex<Vec<CompletionRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    responses: Mutex::new(responses.into()),
                    requests: Arc::clone(&requests),
                },
                requests,
            )
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| anyhow::bail!("scripted provider ran out of responses"))
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    /// Tool that records its invocations and returns a fixed payload.
    struct RecordingTool {
        calls: Arc<Mutex<Vec<serde_json::Value>>>,
        payload: serde_json::Value,
    }

    impl RecordingTool {
        fn new(payload: serde_json::Value) -> (Self, Arc<Mutex<Vec<serde_json::Value>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: Arc::clone(&calls),
                    payload,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            "get_weather"
        }

        fn description(&self) -> &str {
            "Fixed-payload weather stand-in"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" }
                },
                "required": ["latitude", "longitude"]
            })
        }

        async fn execute(&self, args: &serde_json::Value) -> Result<serde_json::Value, ChatError> {
            self.calls.lock().unwrap().push(args.clone());
            Ok(self.payload.clone())
        }
    }

    fn weather_call() -> ToolCall {
        ToolCall {
            name: "get_weather".to_string(),
            args: json!({ "latitude": 47.6, "longitude": -122.3 }),
        }
    }

    fn tool_call_response(calls: Vec<ToolCall>) -> CompletionResponse {
        CompletionResponse {
            text: String::new(),
            tool_calls: calls,
        }
    }

    fn service_with(
        responses: Vec<Result<CompletionResponse>>,
        payload: serde_json::Value,
    ) -> (
        ChatService,
        Arc<Mutex<Vec<CompletionRequest>>>,
        Arc<Mutex<Vec<serde_json::Value>>>,
    ) {
        let (provider, requests) = ScriptedProvider::new(responses);
        let (tool, tool_calls) = RecordingTool::new(payload);
        let mut router = ToolRouter::new();
        router.register(Box::new(tool));
        let service = ChatService::new(Box::new(provider), router, "test-model", 1);
        (service, requests, tool_calls)
    }

    #[tokio::test]
    async fn test_plain_text_reply_skips_tools() {
        let (service, requests, tool_calls) = service_with(
            vec![Ok(CompletionResponse::text_only("Hi! How can I help?"))],
            json!([]),
        );

        let outcome = service.handle(&[], "Hello").await.unwrap();

        assert_eq!(outcome.text, "Hi! How can I help?");
        assert!(!outcome.tool_used);
        assert!(tool_calls.lock().unwrap().is_empty());

        // The single call carried the tool declarations.
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].tools[0].name, "get_weather");
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let periods = json!([
            { "name": "Tonight", "detailedForecast": "Clear" },
            { "name": "Saturday", "detailedForecast": "Sunny" },
            { "name": "Saturday Night", "detailedForecast": "Cool" }
        ]);
        let (service, requests, tool_calls) = service_with(
            vec![
                Ok(tool_call_response(vec![weather_call()])),
                Ok(CompletionResponse::text_only("Clear tonight, sunny Saturday.")),
            ],
            periods.clone(),
        );

        let outcome = service.handle(&[], "Weather in Seattle?").await.unwrap();

        assert_eq!(outcome.text, "Clear tonight, sunny Saturday.");
        assert!(outcome.tool_used);

        let tool_calls = tool_calls.lock().unwrap();
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0]["latitude"], 47.6);

        // Second call: no declarations, history extended by two turns.
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tools.is_empty());

        let turns = &requests[1].turns;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, TurnRole::Model);
        assert_eq!(
            turns[1].tool_call.as_ref().unwrap().name,
            "get_weather"
        );
        assert_eq!(turns[2].role, TurnRole::Function);
        assert_eq!(turns[2].tool_result.as_ref().unwrap().content, periods);
    }

    #[tokio::test]
    async fn test_tool_error_payload_still_reaches_second_round() {
        let (service, requests, _) = service_with(
            vec![
                Ok(tool_call_response(vec![weather_call()])),
                Ok(CompletionResponse::text_only(
                    "Sorry, I can only look up US locations.",
                )),
            ],
            json!({ "error": "Location not found." }),
        );

        let outcome = service.handle(&[], "Weather in London?").await.unwrap();

        assert_eq!(outcome.text, "Sorry, I can only look up US locations.");
        assert!(outcome.tool_used);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let result_turn = &requests[1].turns[2];
        assert_eq!(
            result_turn.tool_result.as_ref().unwrap().content["error"],
            "Location not found."
        );
    }

    #[tokio::test]
    async fn test_unregistered_tool_aborts_without_dispatch() {
        let (service, requests, tool_calls) = service_with(
            vec![Ok(tool_call_response(vec![ToolCall {
                name: "launch_rockets".to_string(),
                args: json!({}),
            }]))],
            json!([]),
        );

        let err = service.handle(&[], "Hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Validation(_)));
        assert!(tool_calls.lock().unwrap().is_empty());
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_only_first_tool_candidate_is_honored() {
        let extra = ToolCall {
            name: "get_weather".to_string(),
            args: json!({ "latitude": 40.7, "longitude": -74.0 }),
        };
        let (service, _, tool_calls) = service_with(
            vec![
                Ok(tool_call_response(vec![weather_call(), extra])),
                Ok(CompletionResponse::text_only("Done.")),
            ],
            json!([]),
        );

        let outcome = service.handle(&[], "Weather?").await.unwrap();

        assert!(outcome.tool_used);
        let tool_calls = tool_calls.lock().unwrap();
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0]["latitude"], 47.6);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_before_dispatch() {
        let (service, _, tool_calls) = service_with(
            vec![Err(anyhow::anyhow!("connection refused"))],
            json!([]),
        );

        let err = service.handle(&[], "Hello").await.unwrap_err();

        assert!(matches!(err, ChatError::UpstreamModel(_)));
        assert!(tool_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_cap_stops_tool_chain() {
        // The model keeps asking for tools; after the cap only its text
        // is taken, even when the reply is empty.
        let (service, requests, tool_calls) = service_with(
            vec![
                Ok(tool_call_response(vec![weather_call()])),
                Ok(tool_call_response(vec![weather_call()])),
            ],
            json!([]),
        );

        let outcome = service.handle(&[], "Weather?").await.unwrap();

        assert!(outcome.tool_used);
        assert_eq!(outcome.text, EMPTY_SUMMARY_FALLBACK);
        assert_eq!(tool_calls.lock().unwrap().len(), 1);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back_to_placeholder() {
        let (service, _, _) =
            service_with(vec![Ok(CompletionResponse::text_only(""))], json!([]));

        let outcome = service.handle(&[], "Hello").await.unwrap();

        assert_eq!(outcome.text, EMPTY_REPLY_FALLBACK);
        assert!(!outcome.tool_used);
    }

    #[tokio::test]
    async fn test_validation_error_skips_provider() {
        let (service, requests, _) = service_with(vec![], json!([]));

        let history = vec![ChatMessage::new("system", "be nice")];
        let err = service.handle(&history, "Hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Validation(_)));
        assert!(requests.lock().unwrap().is_empty());
    }
}
