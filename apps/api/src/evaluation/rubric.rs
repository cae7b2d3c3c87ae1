//! Rubric payload validation.
//!
//! Two stages: `parse_generation_payload` turns generator text into a JSON
//! object (the only stage that can fail), then `validate_rubric_payload`
//! repairs whatever it finds inside into a fully populated `ValidatedRubric`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::evaluation::coercion::{coerce_score, json_type_name, DEFAULT_SCORE};
use crate::evaluation::EvaluationGenerationError;
use crate::llm_client::strip_json_fences;
use crate::models::interview::RubricScores;

/// Longest excerpt of unparseable generator text written to the log.
const LOG_EXCERPT_CHARS: usize = 500;

/// A narrative string field the generator is asked to fill.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeField {
    /// Key in the generator's JSON.
    pub key: &'static str,
    /// Human label used in the placeholder text.
    pub label: &'static str,
    /// Required fields always end up populated; optional ones may stay absent.
    pub required: bool,
}

/// What a rubric payload must contain for one evaluation kind.
#[derive(Debug, Clone, Copy)]
pub struct RubricSchema {
    /// "response" or "essay"; used in placeholder text.
    pub subject: &'static str,
    pub required_dimensions: &'static [&'static str],
    pub narratives: &'static [NarrativeField],
}

impl RubricSchema {
    pub fn placeholder(&self, field: &NarrativeField) -> String {
        format!("{} not available for this {}.", field.label, self.subject)
    }

    pub fn placeholder_for(&self, key: &str) -> String {
        match self.narratives.iter().find(|field| field.key == key) {
            Some(field) => self.placeholder(field),
            None => format!("{key} not available for this {}.", self.subject),
        }
    }
}

/// Output of validation: every required narrative and dimension is present.
#[derive(Debug, Clone)]
pub struct ValidatedRubric {
    narratives: BTreeMap<&'static str, String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub scores: RubricScores,
}

impl ValidatedRubric {
    /// Removes and returns a narrative. Required fields are always `Some`.
    pub fn take_narrative(&mut self, key: &str) -> Option<String> {
        self.narratives.remove(key)
    }

    /// Like `take_narrative`, but never empty-handed.
    pub fn take_required(&mut self, schema: &RubricSchema, key: &str) -> String {
        self.take_narrative(key)
            .unwrap_or_else(|| schema.placeholder_for(key))
    }
}

/// Parses generator text as a JSON object after stripping code fences.
pub fn parse_generation_payload(text: &str) -> Result<Map<String, Value>, EvaluationGenerationError> {
    if text.trim().is_empty() {
        return Err(EvaluationGenerationError::EmptyResponse);
    }

    let cleaned = strip_json_fences(text);

    let parsed: Value = serde_json::from_str(cleaned).map_err(|e| {
        error!("Failed to parse evaluation JSON: {e}");
        error!("Response content: {}", excerpt(cleaned));
        EvaluationGenerationError::MalformedJson(e)
    })?;

    match parsed {
        Value::Object(map) => Ok(map),
        other => {
            error!("Evaluation payload is a JSON {}, not an object", json_type_name(&other));
            Err(EvaluationGenerationError::NotAnObject {
                found: json_type_name(&other),
            })
        }
    }
}

/// Repairs a parsed payload against `schema`. Never fails.
///
/// - every `rubric_scores` entry goes through `coerce_score`
/// - missing required dimensions are inserted at the default score
/// - extra dimensions returned by the generator are kept
/// - missing, blank or non-string required narratives get a placeholder
/// - `strengths` / `improvements` keep only non-blank strings
pub fn validate_rubric_payload(raw: &Map<String, Value>, schema: &RubricSchema) -> ValidatedRubric {
    let mut scores = RubricScores::new();

    match raw.get("rubric_scores") {
        Some(Value::Object(entries)) => {
            for (dimension, value) in entries {
                scores.insert(
                    dimension.clone(),
                    coerce_score(value, dimension, DEFAULT_SCORE),
                );
            }
        }
        Some(other) => warn!(
            "rubric_scores is a {} in {} payload, using default scores",
            json_type_name(other),
            schema.subject
        ),
        None => warn!(
            "rubric_scores missing from {} payload, using default scores",
            schema.subject
        ),
    }

    for dimension in schema.required_dimensions {
        if !scores.contains_key(*dimension) {
            warn!("Missing required rubric dimension: {dimension}, using default {DEFAULT_SCORE}");
            scores.insert((*dimension).to_string(), DEFAULT_SCORE);
        }
    }

    let mut narratives = BTreeMap::new();
    for field in schema.narratives {
        match non_blank_string(raw.get(field.key)) {
            Some(text) => {
                narratives.insert(field.key, text);
            }
            None if field.required => {
                warn!("Missing {} in {} payload, substituting placeholder", field.key, schema.subject);
                narratives.insert(field.key, schema.placeholder(field));
            }
            None => debug!("Optional {} absent from {} payload", field.key, schema.subject),
        }
    }

    ValidatedRubric {
        narratives,
        strengths: string_list(raw.get("strengths"), "strengths"),
        improvements: string_list(raw.get("improvements"), "improvements"),
        scores,
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn string_list(value: Option<&Value>, field: &str) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| non_blank_string(Some(item)))
            .collect(),
        Some(other) => {
            warn!("{field} is a {}, not an array; using empty list", json_type_name(other));
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(LOG_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DIMENSIONS: &[&str] = &["Leadership", "Communication", "Clarity", "Impact", "Fit"];
    const NARRATIVES: &[NarrativeField] = &[
        NarrativeField {
            key: "tone_analysis",
            label: "Tone analysis",
            required: true,
        },
        NarrativeField {
            key: "non_verbal_analysis",
            label: "Non-verbal analysis",
            required: false,
        },
    ];
    const SCHEMA: RubricSchema = RubricSchema {
        subject: "response",
        required_dimensions: DIMENSIONS,
        narratives: NARRATIVES,
    };

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_parse_plain_object() {
        let map = parse_generation_payload(r#"{"strengths": []}"#).unwrap();
        assert!(map.contains_key("strengths"));
    }

    #[test]
    fn test_parse_fenced_object() {
        let map = parse_generation_payload("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(map["a"], 1);
    }

    #[test]
    fn test_parse_empty_text_is_empty_response() {
        assert!(matches!(
            parse_generation_payload("  \n"),
            Err(EvaluationGenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_prose_is_malformed() {
        assert!(matches!(
            parse_generation_payload("I'm sorry, I can't evaluate this."),
            Err(EvaluationGenerationError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_parse_array_is_not_an_object() {
        assert!(matches!(
            parse_generation_payload("[1, 2, 3]"),
            Err(EvaluationGenerationError::NotAnObject { found: "array" })
        ));
    }

    #[test]
    fn test_dimension_floor_fills_missing() {
        let raw = as_map(json!({ "rubric_scores": { "Leadership": 9 } }));
        let validated = validate_rubric_payload(&raw, &SCHEMA);

        for dimension in DIMENSIONS {
            let score = validated.scores[*dimension];
            assert!((0.0..=10.0).contains(&score));
        }
        assert_eq!(validated.scores["Leadership"], 9.0);
        assert_eq!(validated.scores["Fit"], DEFAULT_SCORE);
    }

    #[test]
    fn test_missing_rubric_object_gets_all_defaults() {
        let validated = validate_rubric_payload(&as_map(json!({})), &SCHEMA);
        assert_eq!(validated.scores.len(), DIMENSIONS.len());
        assert!(validated.scores.values().all(|s| *s == DEFAULT_SCORE));

        let validated =
            validate_rubric_payload(&as_map(json!({ "rubric_scores": "8" })), &SCHEMA);
        assert_eq!(validated.scores.len(), DIMENSIONS.len());
    }

    #[test]
    fn test_extra_dimensions_are_preserved() {
        let raw = as_map(json!({ "rubric_scores": { "Storytelling": "7.25" } }));
        let validated = validate_rubric_payload(&raw, &SCHEMA);
        assert_eq!(validated.scores["Storytelling"], 7.25);
        assert_eq!(validated.scores.len(), DIMENSIONS.len() + 1);
    }

    #[test]
    fn test_scores_are_coerced() {
        let raw = as_map(json!({
            "rubric_scores": {
                "Leadership": "8.5",
                "Communication": null,
                "Clarity": 14,
                "Impact": "strong",
                "Fit": -2
            }
        }));
        let scores = validate_rubric_payload(&raw, &SCHEMA).scores;
        assert_eq!(scores["Leadership"], 8.5);
        assert_eq!(scores["Communication"], 5.0);
        assert_eq!(scores["Clarity"], 10.0);
        assert_eq!(scores["Impact"], 5.0);
        assert_eq!(scores["Fit"], 0.0);
    }

    #[test]
    fn test_required_narrative_placeholder() {
        let raw = as_map(json!({ "tone_analysis": "   " }));
        let mut validated = validate_rubric_payload(&raw, &SCHEMA);
        assert_eq!(
            validated.take_narrative("tone_analysis").as_deref(),
            Some("Tone analysis not available for this response.")
        );
        assert!(validated.take_narrative("non_verbal_analysis").is_none());
    }

    #[test]
    fn test_non_string_narrative_is_replaced() {
        let raw = as_map(json!({ "tone_analysis": 42, "non_verbal_analysis": "Steady eye contact." }));
        let mut validated = validate_rubric_payload(&raw, &SCHEMA);
        assert!(validated
            .take_narrative("tone_analysis")
            .unwrap()
            .contains("not available"));
        assert_eq!(
            validated.take_narrative("non_verbal_analysis").as_deref(),
            Some("Steady eye contact.")
        );
    }

    #[test]
    fn test_string_lists_are_sanitized() {
        let raw = as_map(json!({
            "strengths": ["Clear structure", 3, "", null, "Good pace"],
            "improvements": "Be more concise"
        }));
        let validated = validate_rubric_payload(&raw, &SCHEMA);
        assert_eq!(validated.strengths, vec!["Clear structure", "Good pace"]);
        assert!(validated.improvements.is_empty());
    }
}
