//! skychat - a chat backend that augments a completion model with a live
//! weather-forecast tool.
//!
//! The request cycle: client turns are translated into provider turns, the
//! model is called with the tool registry attached, a tool-invocation
//! request (if any) is dispatched against the forecast service, and a
//! second model call synthesizes the final answer.

pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod server;
pub mod tools;
pub mod types;
