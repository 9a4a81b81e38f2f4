//! Core data types used throughout skychat.
//!
//! This module defines the client-facing API shapes, the internal
//! conversation turn types, and the request/response formats that flow
//! between the orchestrator, the completion provider, and the tools.

use serde::{Deserialize, Serialize};

// --- Client boundary ---

/// A single message as the client sends it: a role string plus text.
///
/// The role arrives as a free string and is validated by the history
/// translator (`"user"` or `"model"`), so an unknown role becomes a
/// descriptive validation error rather than a serde rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// Body of `POST /api/chat`: the conversation so far plus the new message.
///
/// The client resends the full history on every request; nothing is
/// persisted server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatApiRequest {
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// Successful reply: the synthesized text and whether a tool ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatApiResponse {
    pub text: String,
    #[serde(rename = "toolUsed")]
    pub tool_used: bool,
}

// --- Conversation turns ---

/// Who produced a turn in the conversation sent to the completion provider.
///
/// - `User`: the human's input
/// - `Model`: the model's output, including tool-invocation requests
/// - `Function`: the result of a tool execution, fed back to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
    Function,
}

/// A tool-invocation request issued by the completion provider.
///
/// `args` is the argument map exactly as the model produced it; values are
/// already type-coerced by the provider against the declared schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// The payload handed back to the model after a tool ran.
///
/// `content` is either the tool's success payload or an `{"error": ...}`
/// object; adapter failures ride through as data so the model can phrase
/// them for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub name: String,
    pub content: serde_json::Value,
}

/// A single turn in the conversation history.
///
/// Turns are immutable once appended; ordering is the sole timeline. A
/// model turn may carry a tool call, and a function turn carries the
/// matching tool result.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub tool_call: Option<ToolCall>,
    pub tool_result: Option<ToolResult>,
}

impl Turn {
    /// Create a user text turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            tool_call: None,
            tool_result: None,
        }
    }

    /// Create a model text turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
            tool_call: None,
            tool_result: None,
        }
    }

    /// Create a model turn recording a tool-invocation request.
    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            role: TurnRole::Model,
            text: String::new(),
            tool_call: Some(call),
            tool_result: None,
        }
    }

    /// Create a function turn carrying a tool result.
    pub fn tool_result(name: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            role: TurnRole::Function,
            text: String::new(),
            tool_call: None,
            tool_result: Some(ToolResult {
                name: name.into(),
                content,
            }),
        }
    }
}

// --- Tool declarations ---

/// Describes a tool's interface to the completion provider via JSON Schema.
///
/// This is attached to the first-round completion call so the model knows
/// what the tool does and what arguments it accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// --- Completion request / response ---

/// A request to send to the completion provider.
///
/// This is the internal representation; the provider client converts it
/// into the provider-specific API format.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    /// Tool declarations for this round; empty when tool use is disallowed.
    pub tools: Vec<ToolDefinition>,
}

/// The response from a completion call.
///
/// Contains text, tool-invocation requests, or both.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (may be empty if the model only requested a tool).
    pub text: String,
    /// Tool calls in provider order (empty for a plain text reply).
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResponse {
    /// Build a plain text response, for fallbacks and tests.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }
}
