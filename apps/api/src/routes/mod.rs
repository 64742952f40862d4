pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::chat::handlers as chat_handlers;
use crate::session::handlers as session_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/session",
            post(session_handlers::handle_issue_session),
        )
        .route("/api/v1/chat", post(chat_handlers::handle_chat))
        .with_state(state)
}
