use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::webhook_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/bot_webhook/", post(webhook_controller::post_webhook))
        .route("/health", get(webhook_controller::health))
}
