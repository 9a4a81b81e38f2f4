//! Configuration management for skychat.
//!
//! Settings load from `skychat.toml` in the working directory, with
//! environment-variable overrides. The completion-provider credential is
//! the one secret: it is resolved from the environment at startup and
//! never written back to disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFIG_FILE: &str = "skychat.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How many tool round trips one request may use. One round is the
    /// designed shape; raising this allows chained tool calls.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the forecast point-lookup service.
    #[serde(default = "default_points_base")]
    pub points_base: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_tool_rounds() -> u32 {
    1
}

fn default_points_base() -> String {
    "https://api.weather.gov".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: None,
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            points_base: default_points_base(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {CONFIG_FILE}"))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {CONFIG_FILE}"))?
        } else {
            Self::default()
        };

        if let Ok(model) = std::env::var("SKYCHAT_MODEL") {
            config.llm.model = model;
        }
        if let Ok(api_base) = std::env::var("SKYCHAT_API_BASE") {
            config.llm.api_base = Some(api_base);
        }
        if let Ok(host) = std::env::var("SKYCHAT_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("SKYCHAT_PORT") {
            config.server.port = port.parse().context("SKYCHAT_PORT must be a port number")?;
        }

        Ok(config)
    }

    /// Resolve the completion-provider credential.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.llm.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var(&self.llm.api_key_env).with_context(|| {
            format!(
                "API key not found. Either:\n  \
                 1. Set api_key under [llm] in {CONFIG_FILE}\n  \
                 2. Set environment variable: export {}=your-key",
                self.llm.api_key_env
            )
        })
    }
}
