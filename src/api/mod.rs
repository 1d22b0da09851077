// src/api/mod.rs - Inbound HTTP surface (liveness + webhook)

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::bot::Conversation;
use crate::infra::config::ServerConfig;
use crate::telegram::{self, types::Update};

/// Fixed webhook acknowledgment, returned for every POST. The platform
/// retries on failure statuses, so it must never see one.
const WEBHOOK_ACK: &str = "ok";

const LIVENESS: &str = "🤖 Voice Generator Bot is running!";

#[derive(Clone)]
pub struct ApiState {
    pub conversation: Arc<Conversation>,
}

/// Build the axum router with both endpoints.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    LIVENESS
}

async fn webhook(State(state): State<ApiState>, body: String) -> &'static str {
    match serde_json::from_str::<Update>(&body) {
        Ok(update) => {
            if let Some((chat_id, event)) = telegram::route_update(&update) {
                let conversation = state.conversation.clone();
                tokio::spawn(async move {
                    conversation.dispatch(&chat_id, event).await;
                });
            }
        }
        Err(e) => tracing::error!("Webhook payload did not parse: {}", e),
    }
    WEBHOOK_ACK
}

/// Start the webhook server (blocking).
pub async fn start_server(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let router = build_router(state);

    tracing::info!("Webhook server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
