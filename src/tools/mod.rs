//! Tool system module.
//!
//! Defines the `Tool` trait and the `ToolRouter` that together form the
//! tool-dispatch framework the orchestrator drives.
//!
//! Key concepts:
//! - **Tool trait**: a capability the completion provider may request,
//!   described by a name, a purpose, and a JSON-Schema argument shape
//! - **ToolRouter**: the read-only registry; dispatches an invocation
//!   request by name to the matching implementation
//! - **Results are data**: a tool returns a JSON payload even on internal
//!   failure (an `{"error": ...}` object), so the model can phrase the
//!   failure for the user. Only invalid invocations (unknown name, missing
//!   arguments) abort the request.

pub mod weather;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::types::ToolDefinition;

/// Trait all invocable capabilities implement.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "get_weather").
    fn name(&self) -> &str;

    /// What this tool does; the model reads this to decide applicability.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the argument map the model supplied.
    ///
    /// Missing or malformed required arguments are a
    /// `ChatError::Validation`; the tool's own upstream failures come back
    /// as an `Ok` error payload.
    async fn execute(&self, args: &serde_json::Value) -> Result<serde_json::Value, ChatError>;

    /// Convert this tool into the declaration sent to the provider.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Routes tool-invocation requests to the registered implementation.
///
/// Read-only after startup; adding a capability is one `register` call and
/// does not change the dispatch contract.
pub struct ToolRouter {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRouter {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// All declarations, for attaching to a first-round completion call.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Dispatch an invocation request by name.
    ///
    /// A name absent from the registry is a validation failure, not a
    /// silent no-op.
    pub async fn execute(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, ChatError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ChatError::validation(format!("unknown tool: {name}")))?;

        tool.execute(args).await
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the router with the built-in weather tool registered.
pub fn create_default_router(points_base: &str) -> anyhow::Result<ToolRouter> {
    let mut router = ToolRouter::new();
    router.register(Box::new(weather::WeatherTool::new(points_base.to_string())?));
    Ok(router)
}
