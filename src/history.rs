//! History Translator.
//!
//! Converts the client's visible conversation (role string + text pairs)
//! into the ordered turn sequence sent to the completion provider, and
//! appends the new user message as the final turn.
//!
//! This is the single place client input is validated: only the `user` and
//! `model` roles are accepted, two consecutive turns may not share a role,
//! and the new message must be non-empty. The translator never rewrites,
//! truncates, or reorders history.

use crate::error::ChatError;
use crate::types::{ChatMessage, Turn, TurnRole};

/// Translate client history plus the new message into provider turns.
///
/// Pure function: the output always ends with exactly one new user turn,
/// so the turn sequence handed to the orchestrator is never empty.
pub fn translate(history: &[ChatMessage], message: &str) -> Result<Vec<Turn>, ChatError> {
    if message.trim().is_empty() {
        return Err(ChatError::validation("message must not be empty"));
    }

    let mut turns = Vec::with_capacity(history.len() + 1);
    let mut previous_role: Option<TurnRole> = None;

    for (index, msg) in history.iter().enumerate() {
        let role = match msg.role.as_str() {
            "user" => TurnRole::User,
            "model" => TurnRole::Model,
            other => {
                return Err(ChatError::validation(format!(
                    "history[{index}]: unknown role '{other}' (expected 'user' or 'model')"
                )))
            }
        };

        if previous_role == Some(role) {
            return Err(ChatError::validation(format!(
                "history[{index}]: consecutive '{}' turns are not allowed",
                msg.role
            )));
        }
        previous_role = Some(role);

        turns.push(match role {
            TurnRole::User => Turn::user(&msg.text),
            TurnRole::Model => Turn::model(&msg.text),
            TurnRole::Function => unreachable!("function turns never come from the client"),
        });
    }

    turns.push(Turn::user(message));
    Ok(turns)
}
