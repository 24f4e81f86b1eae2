//! HTTP request handlers

use super::wire::{ChatReply, ChatRequest, ErrorBody};
use super::AppState;
use crate::proxy::ProxyError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat relay
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ProxyError> {
    let Json(request) = payload.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;

    let turns = request.messages.len();
    match state.proxy.forward(request).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::warn!(turns, status = %e.status(), error = %e, "Chat request failed");
            Err(e)
        }
    }
}

async fn get_version() -> &'static str {
    concat!("chat-relay ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody::new(self.kind(), self.public_message()));
        (self.status(), body).into_response()
    }
}

/// Body for panics caught by the middleware stack
pub fn internal_error_response() -> Response {
    let body = Json(ErrorBody::new("internal_error", "Internal Server Error"));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
