//! Folds essay scores into the interview rubric.
//!
//! | Essay dimension  | Interview dimension |
//! |------------------|---------------------|
//! | Writing Quality  | Communication       |
//! | Clarity          | Communication       |
//! | Structure        | Clarity             |
//! | Depth            | Impact              |
//! | Impact           | Impact              |

use tracing::{debug, info};

use crate::evaluation::compiler::{overall_score, RubricAccumulator};
use crate::models::interview::{EssayEvaluation, InterviewEvaluation};

/// Interview dimension an essay dimension contributes to, if any.
pub fn map_essay_dimension(essay_dimension: &str) -> Option<&'static str> {
    match essay_dimension {
        "Writing Quality" | "Clarity" => Some("Communication"),
        "Structure" => Some("Clarity"),
        "Depth" | "Impact" => Some("Impact"),
        _ => None,
    }
}

/// Recomputes the rubric from raw response scores plus remapped essay scores
/// and attaches the essays.
///
/// Merged dimensions overwrite the compiled averages; dimensions no essay or
/// response touches are left as they were. An empty `essays` list leaves the
/// evaluation unchanged.
pub fn merge_essay_evaluations(
    mut evaluation: InterviewEvaluation,
    essays: Vec<EssayEvaluation>,
) -> InterviewEvaluation {
    if essays.is_empty() {
        return evaluation;
    }

    let mut accumulator = RubricAccumulator::new();
    for response in &evaluation.responses {
        accumulator.extend(&response.scores);
    }
    for essay in &essays {
        for (dimension, score) in &essay.scores {
            match map_essay_dimension(dimension) {
                Some(mapped) => accumulator.push(mapped, *score),
                None => debug!("Essay dimension {dimension} has no interview mapping, dropped"),
            }
        }
    }

    let combined = accumulator.averages();
    evaluation.overall_score = overall_score(&combined).unwrap_or(evaluation.overall_score);
    evaluation.rubric_scores.extend(combined);
    evaluation.essay_evaluations = Some(essays);

    info!(
        overall_score = evaluation.overall_score,
        essays = evaluation.essay_evaluations.as_ref().map_or(0, Vec::len),
        "Essay scores merged into interview evaluation"
    );
    evaluation
}
