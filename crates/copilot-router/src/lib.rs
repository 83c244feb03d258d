//! Inbound, OpenAI-compatible HTTP surface of the gateway.
//!
//! Token acquisition is delegated to a [`TokenProvider`]; everything that
//! talks to the backend goes through [`copilot_client::CopilotClient`].

mod auth;
mod chat;
mod error;
mod models;
pub mod tokens;

use std::sync::Arc;

use axum::routing::{any, get};
use axum::{Json, Router};

use copilot_client::CopilotClient;

pub use tokens::{PassthroughTokens, TokenError, TokenProvider};

#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<CopilotClient>,
    pub tokens: Arc<dyn TokenProvider>,
}

pub fn gateway_router(client: Arc<CopilotClient>, tokens: Arc<dyn TokenProvider>) -> Router {
    let state = GatewayState { client, tokens };

    Router::new()
        // Method checks happen in the handlers so wrong verbs get a JSON 405.
        .route("/v1/models", any(models::list_models))
        .route("/models", any(models::list_models))
        .route("/v1/chat/completions", any(chat::chat_completions))
        .route("/chat/completions", any(chat::chat_completions))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
