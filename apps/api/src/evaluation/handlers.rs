//! Axum route handlers for the Interview Evaluation API.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::evaluation::session::{evaluate_session, EvaluateRequest};
use crate::state::AppState;
use crate::store::EvaluationRecord;

/// POST /api/interviews/evaluate
///
/// Evaluates every answered question (and any submitted essays) for a session
/// and stores the result. Generation failures return 502 with `retryable: true`.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationRecord>, AppError> {
    let record = evaluate_session(state.generator.as_ref(), state.store.as_ref(), request).await?;
    Ok(Json(record))
}

/// GET /api/interviews/evaluations/:session_id
pub async fn handle_get_evaluation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<EvaluationRecord>, AppError> {
    state
        .store
        .load_evaluation(&session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Evaluation for session {session_id}")))
}
