pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::roast::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::handle_landing))
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/roasts",
            post(handlers::handle_create_roast).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/roasts/share", post(handlers::handle_share_roast))
        .route("/api/v1/roasts/:id", get(handlers::handle_get_roast))
        .with_state(state)
}
