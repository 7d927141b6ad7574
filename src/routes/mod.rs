use axum::Router;

use crate::{AppState, controllers::webhook_controller};

pub mod webhook_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = webhook_routes::add_routes(router);

    router
        .fallback(webhook_controller::not_found)
        .with_state(state)
}
