//! HTTP surface: the `/api/chat` route and error mapping.
//!
//! The handler is a thin shell around `ChatService::handle`. Validation
//! failures map to 400 with the descriptive message; everything else maps
//! to 500 with an opaque message, and the full error chain goes to the
//! server log only.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::chat::ChatService;
use crate::error::ChatError;
use crate::types::{ChatApiRequest, ChatApiResponse};

pub struct AppState {
    pub chat: ChatService,
}

pub fn get_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, ApiError> {
    let outcome = state.chat.handle(&request.history, &request.message).await?;
    Ok(Json(ChatApiResponse {
        text: outcome.text,
        tool_used: outcome.tool_used,
    }))
}

/// Wrapper that turns a `ChatError` into the client-facing error shape.
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ChatError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ChatError::UpstreamModel(_) | ChatError::Internal(_) => {
                // Upstream payloads and internal chains stay in the log.
                error!(error = %self.0, "chat request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
