pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview Evaluation API
        .route("/api/interviews/evaluate", post(handlers::handle_evaluate))
        .route(
            "/api/interviews/evaluations/:session_id",
            get(handlers::handle_get_evaluation),
        )
        .with_state(state)
}
