//! Interview-level aggregation: evaluate every response, then average
//! per-dimension scores into the interview rubric.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::evaluation::coercion::{mean, round2};
use crate::evaluation::response::{evaluate_response, ResponseEvaluationInput};
use crate::evaluation::EvaluationError;
use crate::llm_client::GenerationService;
use crate::models::interview::{InterviewEvaluation, RubricScores};

/// Collects raw scores per dimension before averaging.
#[derive(Debug, Default)]
pub struct RubricAccumulator {
    values: BTreeMap<String, Vec<f64>>,
}

impl RubricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite scores are dropped.
    pub fn push(&mut self, dimension: &str, score: f64) {
        if !score.is_finite() {
            warn!("Skipping non-finite score for {dimension}: {score}");
            return;
        }
        self.values
            .entry(dimension.to_string())
            .or_default()
            .push(score);
    }

    pub fn extend(&mut self, scores: &RubricScores) {
        for (dimension, score) in scores {
            self.push(dimension, *score);
        }
    }

    /// `round2(mean)` for every dimension with at least one value.
    pub fn averages(&self) -> RubricScores {
        self.values
            .iter()
            .filter_map(|(dimension, values)| {
                mean(values).map(|avg| (dimension.clone(), round2(avg)))
            })
            .collect()
    }
}

/// `round2(mean(rubric values))`, `None` when the rubric is empty.
pub fn overall_score(rubric: &RubricScores) -> Option<f64> {
    let values: Vec<f64> = rubric.values().copied().collect();
    mean(&values).map(round2)
}

/// Evaluates all responses concurrently and aggregates their scores.
///
/// `responses` follows the order of `inputs` regardless of completion order.
/// Any single evaluation failure fails the whole compilation.
pub async fn compile_interview_evaluation(
    generator: &dyn GenerationService,
    inputs: &[ResponseEvaluationInput],
) -> Result<InterviewEvaluation, EvaluationError> {
    if inputs.is_empty() {
        return Err(EvaluationError::NoInputs);
    }

    let responses =
        try_join_all(inputs.iter().map(|input| evaluate_response(generator, input))).await?;

    let mut accumulator = RubricAccumulator::new();
    for response in &responses {
        if response.scores.is_empty() {
            warn!(
                question_id = %response.question_id,
                "Response evaluation has no scores, skipping in aggregate"
            );
            continue;
        }
        accumulator.extend(&response.scores);
    }

    let rubric_scores = accumulator.averages();
    let overall = overall_score(&rubric_scores).unwrap_or(0.0);

    info!(
        responses = responses.len(),
        overall_score = overall,
        "Interview evaluation compiled"
    );

    Ok(InterviewEvaluation {
        overall_score: overall,
        rubric_scores,
        responses,
        essay_evaluations: None,
    })
}
