//! Webhook ingress: one axum router accepting Telegram updates and a
//! health probe.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    },
    tower_http::trace::TraceLayer,
    tracing::warn,
    waggle_dispatch::Dispatcher,
    waggle_telegram::TgUpdate,
};

/// Header Telegram echoes the configured webhook secret in.
const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Empty = no secret check.
    pub secret_token: Arc<str>,
}

pub fn build_app(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(webhook_path, post(on_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Accept one update, verify the shared secret, and hand the event to the
/// dispatcher on its own task. Telegram gets its 200 immediately; dispatch
/// faults are contained by the dispatcher and never surface here.
async fn on_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<TgUpdate>,
) -> StatusCode {
    if !state.secret_token.is_empty() {
        let presented = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != state.secret_token.as_ref() {
            warn!(update_id = update.update_id, "webhook secret mismatch");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let event = update.into_event();
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.dispatch(&event).await;
    });
    StatusCode::OK
}
