//! Per-essay evaluation and the concurrent batch over a session's essays.

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::evaluation::prompts::{build_essay_prompt, essay_system_prompt};
use crate::evaluation::rubric::{
    parse_generation_payload, validate_rubric_payload, NarrativeField, RubricSchema,
};
use crate::evaluation::EvaluationGenerationError;
use crate::llm_client::GenerationService;
use crate::models::interview::{EssayEvaluation, EssayPrompt};
use crate::models::profile::CandidateProfile;

pub const ESSAY_DIMENSIONS: &[&str] = &["Writing Quality", "Clarity", "Structure", "Depth", "Impact"];

const OVERALL_COMMENTARY: &str = "overall_commentary";
const WRITING_CLARITY: &str = "writing_clarity";
const STRUCTURE_ANALYSIS: &str = "structure_analysis";
const DEPTH_ANALYSIS: &str = "depth_analysis";

pub const ESSAY_SCHEMA: RubricSchema = RubricSchema {
    subject: "essay",
    required_dimensions: ESSAY_DIMENSIONS,
    narratives: &[
        NarrativeField {
            key: OVERALL_COMMENTARY,
            label: "Overall commentary",
            required: true,
        },
        NarrativeField {
            key: WRITING_CLARITY,
            label: "Writing clarity analysis",
            required: true,
        },
        NarrativeField {
            key: STRUCTURE_ANALYSIS,
            label: "Structure analysis",
            required: true,
        },
        NarrativeField {
            key: DEPTH_ANALYSIS,
            label: "Depth analysis",
            required: true,
        },
    ],
};

#[derive(Debug, Clone)]
pub struct EssayEvaluationInput {
    pub session_id: String,
    pub essay_prompt: EssayPrompt,
    pub content: String,
    pub profile: CandidateProfile,
}

/// Whitespace-separated token count.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

pub async fn evaluate_essay(
    generator: &dyn GenerationService,
    input: &EssayEvaluationInput,
) -> Result<EssayEvaluation, EvaluationGenerationError> {
    debug!(
        session_id = %input.session_id,
        essay_id = %input.essay_prompt.id,
        "Evaluating essay"
    );

    let words = word_count(&input.content);
    let prompt = build_essay_prompt(&input.essay_prompt, &input.content, words, &input.profile);
    let text = generator.complete(&essay_system_prompt(), &prompt).await?;
    let payload = parse_generation_payload(&text)?;
    let mut rubric = validate_rubric_payload(&payload, &ESSAY_SCHEMA);

    let evaluation = EssayEvaluation {
        essay_id: input.essay_prompt.id.clone(),
        prompt: input.essay_prompt.prompt.clone(),
        content: input.content.clone(),
        word_count: words,
        overall_commentary: rubric.take_required(&ESSAY_SCHEMA, OVERALL_COMMENTARY),
        writing_clarity: rubric.take_required(&ESSAY_SCHEMA, WRITING_CLARITY),
        structure_analysis: rubric.take_required(&ESSAY_SCHEMA, STRUCTURE_ANALYSIS),
        depth_analysis: rubric.take_required(&ESSAY_SCHEMA, DEPTH_ANALYSIS),
        strengths: rubric.strengths,
        improvements: rubric.improvements,
        scores: rubric.scores,
    };

    info!(
        session_id = %input.session_id,
        essay_id = %evaluation.essay_id,
        word_count = evaluation.word_count,
        "Essay evaluated"
    );
    Ok(evaluation)
}

/// Evaluates all essays concurrently. Output order follows `inputs`; the
/// first failure aborts the batch. An empty batch makes no generation calls.
pub async fn evaluate_essays(
    generator: &dyn GenerationService,
    inputs: &[EssayEvaluationInput],
) -> Result<Vec<EssayEvaluation>, EvaluationGenerationError> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    try_join_all(inputs.iter().map(|input| evaluate_essay(generator, input))).await
}
