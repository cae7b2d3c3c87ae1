//! Session-level orchestration: request payload → evaluation inputs →
//! compile → essay merge → persist.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::compiler::compile_interview_evaluation;
use crate::evaluation::essay::{evaluate_essays, EssayEvaluationInput};
use crate::evaluation::merge::merge_essay_evaluations;
use crate::evaluation::response::ResponseEvaluationInput;
use crate::llm_client::GenerationService;
use crate::models::interview::{InterviewSessionPlan, NonVerbalSignal, SpeechAnalyticsSnapshot};
use crate::models::profile::CandidateProfile;
use crate::store::{EvaluationRecord, SessionStore};

// ────────────────────────────────────────────────────────────────────────────
// Request payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub speech: Option<SpeechAnalyticsSnapshot>,
    #[serde(default)]
    pub non_verbal_signals: Vec<NonVerbalSignal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayPayload {
    #[serde(default)]
    pub essay_id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub session_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub responses: Vec<ResponsePayload>,
    #[serde(default)]
    pub essays: Vec<EssayPayload>,
    /// Overrides (and replaces) the stored plan for this session.
    #[serde(default)]
    pub plan: Option<InterviewSessionPlan>,
    /// Overrides (and replaces) the stored profile for this candidate.
    #[serde(default)]
    pub profile: Option<CandidateProfile>,
}

// ────────────────────────────────────────────────────────────────────────────
// Input construction
// ────────────────────────────────────────────────────────────────────────────

/// One input per payload whose question exists in the plan, in payload order.
/// Payloads with a blank or unknown `questionId` are dropped.
pub fn build_response_inputs(
    session_id: &str,
    plan: &InterviewSessionPlan,
    profile: &CandidateProfile,
    payloads: &[ResponsePayload],
) -> Vec<ResponseEvaluationInput> {
    let mut inputs = Vec::with_capacity(payloads.len());
    let mut unmatched = Vec::new();

    for payload in payloads {
        let question_id = payload.question_id.trim();
        if question_id.is_empty() {
            continue;
        }
        let Some(question) = plan.find_question(question_id) else {
            unmatched.push(question_id.to_string());
            continue;
        };

        inputs.push(ResponseEvaluationInput {
            session_id: session_id.to_string(),
            question: question.clone(),
            profile: profile.clone(),
            speech: payload
                .speech
                .clone()
                .unwrap_or_else(SpeechAnalyticsSnapshot::missing),
            non_verbal_signals: payload.non_verbal_signals.clone(),
        });
    }

    if !unmatched.is_empty() {
        warn!(
            session_id,
            ?unmatched,
            "Dropping responses for questions not in the session plan"
        );
    }
    inputs
}

/// One input per essay with content whose prompt exists in the plan.
pub fn build_essay_inputs(
    session_id: &str,
    plan: &InterviewSessionPlan,
    profile: &CandidateProfile,
    payloads: &[EssayPayload],
) -> Vec<EssayEvaluationInput> {
    let prompts = plan.essay_prompts();

    payloads
        .iter()
        .filter(|payload| !payload.essay_id.trim().is_empty() && !payload.content.trim().is_empty())
        .filter_map(|payload| {
            let essay_id = payload.essay_id.trim();
            match prompts.iter().find(|p| p.id == essay_id) {
                Some(prompt) => Some(EssayEvaluationInput {
                    session_id: session_id.to_string(),
                    essay_prompt: (*prompt).clone(),
                    content: payload.content.clone(),
                    profile: profile.clone(),
                }),
                None => {
                    warn!(session_id, essay_id, "Dropping essay with unknown prompt id");
                    None
                }
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestration
// ────────────────────────────────────────────────────────────────────────────

/// Runs a full session evaluation and persists the result.
///
/// Nothing is persisted unless every response and essay evaluation succeeds,
/// so a failed request can be retried as a whole.
pub async fn evaluate_session(
    generator: &dyn GenerationService,
    store: &dyn SessionStore,
    request: EvaluateRequest,
) -> Result<EvaluationRecord, AppError> {
    let session_id = request.session_id.trim().to_string();
    let candidate_id = request.candidate_id.trim().to_string();

    if session_id.is_empty() || candidate_id.is_empty() {
        return Err(AppError::Validation(
            "sessionId and candidateId are required".to_string(),
        ));
    }
    if request.responses.is_empty() {
        return Err(AppError::Validation(
            "At least one response is required".to_string(),
        ));
    }

    let plan_supplied = request.plan.is_some();
    let profile_supplied = request.profile.is_some();
    let plan = resolve_plan(store, &session_id, request.plan).await?;
    let profile = resolve_profile(store, &candidate_id, request.profile).await?;

    if plan.questions.is_empty() {
        return Err(AppError::Validation(
            "Session plan has no questions".to_string(),
        ));
    }

    // Body-supplied records are stored only once both lookups have succeeded.
    if plan_supplied {
        if let Err(e) = store.save_plan(&plan).await {
            warn!("Failed to save plan for session {session_id}: {e:?}");
        }
    }
    if profile_supplied {
        if let Err(e) = store.save_profile(&candidate_id, &profile).await {
            warn!("Failed to save profile for candidate {candidate_id}: {e:?}");
        }
    }

    let response_inputs = build_response_inputs(&session_id, &plan, &profile, &request.responses);
    if response_inputs.is_empty() {
        return Err(AppError::Validation(
            "No responses match questions in the session plan".to_string(),
        ));
    }

    info!(
        session_id = %session_id,
        responses = response_inputs.len(),
        essays = request.essays.len(),
        "Evaluating interview session"
    );

    let mut evaluation = compile_interview_evaluation(generator, &response_inputs).await?;

    let essay_inputs = build_essay_inputs(&session_id, &plan, &profile, &request.essays);
    if !essay_inputs.is_empty() {
        let essays = evaluate_essays(generator, &essay_inputs)
            .await
            .map_err(crate::evaluation::EvaluationError::from)?;
        evaluation = merge_essay_evaluations(evaluation, essays);
    }

    let record = EvaluationRecord {
        session_id: session_id.clone(),
        evaluation,
        evaluated_at: Utc::now(),
    };
    store.save_evaluation(record.clone()).await?;

    info!(
        session_id = %session_id,
        overall_score = record.evaluation.overall_score,
        "Interview session evaluation saved"
    );
    Ok(record)
}

async fn resolve_plan(
    store: &dyn SessionStore,
    session_id: &str,
    supplied: Option<InterviewSessionPlan>,
) -> Result<InterviewSessionPlan, AppError> {
    match supplied {
        Some(plan) => {
            if plan.session_id != session_id {
                return Err(AppError::Validation(format!(
                    "Plan belongs to session {}, not {session_id}",
                    plan.session_id
                )));
            }
            Ok(plan)
        }
        None => store
            .load_plan(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id}"))),
    }
}

async fn resolve_profile(
    store: &dyn SessionStore,
    candidate_id: &str,
    supplied: Option<CandidateProfile>,
) -> Result<CandidateProfile, AppError> {
    match supplied {
        Some(profile) => Ok(profile),
        None => store
            .load_profile(candidate_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate profile {candidate_id}"))),
    }
}
