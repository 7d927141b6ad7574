use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, controllers::commands, models::Update};

// POST /bot_webhook/
// Always 200: Telegram redelivers anything else, and a bad update won't get better.
pub async fn post_webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let update = match serde_json::from_slice::<Update>(&body) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Ignoring malformed update: {}", e);
            return StatusCode::OK;
        }
    };

    let Some(message) = update.message else {
        return StatusCode::OK;
    };
    let Some(text) = message.text else {
        return StatusCode::OK;
    };

    let chat_id = message.chat.id.to_string();
    if let Some(reply) = commands::handle_text(&state.monitor, &chat_id, &text).await {
        state.monitor.notifier().notify(&chat_id, &reply, false).await;
    }

    StatusCode::OK
}

// GET /health
pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}
