//! Per-response evaluation: one interview answer → one `ResponseEvaluation`.

use tracing::{debug, info};

use crate::evaluation::prompts::{build_response_prompt, response_system_prompt};
use crate::evaluation::rubric::{
    parse_generation_payload, validate_rubric_payload, NarrativeField, RubricSchema,
};
use crate::evaluation::EvaluationGenerationError;
use crate::llm_client::GenerationService;
use crate::models::interview::{
    InterviewQuestion, NonVerbalSignal, ResponseEvaluation, SpeechAnalyticsSnapshot,
};
use crate::models::profile::CandidateProfile;

pub const RESPONSE_DIMENSIONS: &[&str] = &["Leadership", "Communication", "Clarity", "Impact", "Fit"];

const OVERALL_COMMENTARY: &str = "overall_commentary";
const TONE_ANALYSIS: &str = "tone_analysis";
const COMMUNICATION_CLARITY: &str = "communication_clarity";
const CONFIDENCE_ANALYSIS: &str = "confidence_analysis";
const NON_VERBAL_ANALYSIS: &str = "non_verbal_analysis";

pub const RESPONSE_SCHEMA: RubricSchema = RubricSchema {
    subject: "response",
    required_dimensions: RESPONSE_DIMENSIONS,
    narratives: &[
        NarrativeField {
            key: OVERALL_COMMENTARY,
            label: "Overall commentary",
            required: true,
        },
        NarrativeField {
            key: TONE_ANALYSIS,
            label: "Tone analysis",
            required: true,
        },
        NarrativeField {
            key: COMMUNICATION_CLARITY,
            label: "Communication clarity analysis",
            required: true,
        },
        NarrativeField {
            key: CONFIDENCE_ANALYSIS,
            label: "Confidence analysis",
            required: true,
        },
        NarrativeField {
            key: NON_VERBAL_ANALYSIS,
            label: "Non-verbal analysis",
            required: false,
        },
    ],
};

/// Everything needed to evaluate one answer. The question is assumed to
/// belong to the session plan; unmatched answers are dropped before this point.
#[derive(Debug, Clone)]
pub struct ResponseEvaluationInput {
    pub session_id: String,
    pub question: InterviewQuestion,
    pub profile: CandidateProfile,
    pub speech: SpeechAnalyticsSnapshot,
    pub non_verbal_signals: Vec<NonVerbalSignal>,
}

pub async fn evaluate_response(
    generator: &dyn GenerationService,
    input: &ResponseEvaluationInput,
) -> Result<ResponseEvaluation, EvaluationGenerationError> {
    debug!(
        session_id = %input.session_id,
        question_id = %input.question.id,
        "Evaluating response"
    );

    let prompt = build_response_prompt(
        &input.question,
        &input.speech,
        &input.non_verbal_signals,
        &input.profile,
    );
    let text = generator.complete(&response_system_prompt(), &prompt).await?;
    let payload = parse_generation_payload(&text)?;
    let mut rubric = validate_rubric_payload(&payload, &RESPONSE_SCHEMA);

    let evaluation = ResponseEvaluation {
        question_id: input.question.id.clone(),
        transcript: input.speech.transcript.clone(),
        overall_commentary: rubric.take_required(&RESPONSE_SCHEMA, OVERALL_COMMENTARY),
        tone_analysis: rubric.take_required(&RESPONSE_SCHEMA, TONE_ANALYSIS),
        communication_clarity: rubric.take_required(&RESPONSE_SCHEMA, COMMUNICATION_CLARITY),
        confidence_analysis: rubric.take_required(&RESPONSE_SCHEMA, CONFIDENCE_ANALYSIS),
        non_verbal_analysis: rubric.take_narrative(NON_VERBAL_ANALYSIS),
        strengths: rubric.strengths,
        improvements: rubric.improvements,
        scores: rubric.scores,
    };

    info!(
        session_id = %input.session_id,
        question_id = %evaluation.question_id,
        dimensions = evaluation.scores.len(),
        "Response evaluated"
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::MISSING_TRANSCRIPT;
    use crate::test_support::{question, response_input, response_json, ScriptedGenerator};

    #[tokio::test]
    async fn test_valid_payload_maps_to_evaluation() {
        let generator = ScriptedGenerator::new().on(
            "Tell me about a setback.",
            response_json(&[
                ("Leadership", 9.0),
                ("Communication", 8.0),
                ("Clarity", 7.0),
                ("Impact", 8.0),
                ("Fit", 9.0),
            ]),
        );
        let input = response_input(question("q1", "Tell me about a setback."));

        let evaluation = evaluate_response(&generator, &input).await.unwrap();

        assert_eq!(evaluation.question_id, "q1");
        assert_eq!(evaluation.transcript, "My answer to q1");
        assert_eq!(evaluation.scores["Leadership"], 9.0);
        assert_eq!(evaluation.tone_analysis, "Warm and steady.");
        assert_eq!(evaluation.overall_commentary, "Solid, well-structured answer.");
        assert_eq!(evaluation.strengths, vec!["Clear STAR structure"]);
        assert!(evaluation.non_verbal_analysis.is_none());
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_fenced_partial_payload_is_repaired() {
        let generator = ScriptedGenerator::new().on(
            "Why consulting?",
            "```json\n{\"rubric_scores\": {\"Leadership\": \"7.5\", \"Fit\": 12}, \"non_verbal_analysis\": \"Good posture.\"}\n```",
        );
        let input = response_input(question("q2", "Why consulting?"));

        let evaluation = evaluate_response(&generator, &input).await.unwrap();

        assert_eq!(evaluation.scores["Leadership"], 7.5);
        assert_eq!(evaluation.scores["Fit"], 10.0);
        assert_eq!(evaluation.scores["Clarity"], 5.0);
        assert_eq!(
            evaluation.tone_analysis,
            "Tone analysis not available for this response."
        );
        assert_eq!(evaluation.non_verbal_analysis.as_deref(), Some("Good posture."));
        assert!(evaluation.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_transcript_is_echoed_not_regenerated() {
        let generator = ScriptedGenerator::new().on(
            "Lead?",
            r#"{"transcript": "hallucinated", "rubric_scores": {}}"#,
        );
        let mut input = response_input(question("q1", "Lead?"));
        input.speech.transcript = MISSING_TRANSCRIPT.to_string();

        let evaluation = evaluate_response(&generator, &input).await.unwrap();
        assert_eq!(evaluation.transcript, MISSING_TRANSCRIPT);
    }

    #[tokio::test]
    async fn test_prose_reply_is_fatal() {
        let generator = ScriptedGenerator::new().on("Lead?", "I cannot help with that.");
        let input = response_input(question("q1", "Lead?"));

        let result = evaluate_response(&generator, &input).await;
        assert!(matches!(result, Err(EvaluationGenerationError::MalformedJson(_))));
    }

    #[tokio::test]
    async fn test_empty_reply_is_fatal() {
        let generator = ScriptedGenerator::new().on("Lead?", "   ");
        let input = response_input(question("q1", "Lead?"));

        let result = evaluate_response(&generator, &input).await;
        assert!(matches!(result, Err(EvaluationGenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let generator = ScriptedGenerator::new().failing("Lead?");
        let input = response_input(question("q1", "Lead?"));

        let result = evaluate_response(&generator, &input).await;
        assert!(matches!(result, Err(EvaluationGenerationError::Service(_))));
    }
}
