//! Interview plan, candidate signals and evaluation records.
//!
//! Field names serialize in camelCase to match the web client's payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Open dimension-name → score mapping. Dimension sets differ between
/// response and essay rubrics, and extra model-returned dimensions are kept.
pub type RubricScores = BTreeMap<String, f64>;

/// Transcript substituted when a response arrives without speech data.
pub const MISSING_TRANSCRIPT: &str = "[No transcript available]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionCategory {
    Behavioral,
    Situational,
    SchoolSpecific,
    Essay,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Behavioral => "behavioral",
            QuestionCategory::Situational => "situational",
            QuestionCategory::SchoolSpecific => "school-specific",
            QuestionCategory::Essay => "essay",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub id: String,
    pub category: QuestionCategory,
    pub prompt: String,
    #[serde(default)]
    pub follow_ups: Vec<String>,
    #[serde(default)]
    pub rubric_focus: Vec<String>,
    #[serde(default)]
    pub preparation_seconds: u32,
    #[serde(default)]
    pub response_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayPrompt {
    pub id: String,
    pub prompt: String,
    pub target_word_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSessionPlan {
    pub session_id: String,
    pub candidate_id: String,
    #[serde(default)]
    pub questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub essay_prompt: Option<EssayPrompt>,
    #[serde(default)]
    pub essay_prompts: Vec<EssayPrompt>,
}

impl InterviewSessionPlan {
    pub fn find_question(&self, question_id: &str) -> Option<&InterviewQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// The multi-prompt list when present, otherwise the legacy single prompt.
    pub fn essay_prompts(&self) -> Vec<&EssayPrompt> {
        if self.essay_prompts.is_empty() {
            self.essay_prompt.iter().collect()
        } else {
            self.essay_prompts.iter().collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// Speech analytics for one recorded answer. Read-only once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAnalyticsSnapshot {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub filler_word_count: u32,
    #[serde(default)]
    pub speaking_rate_wpm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_pitch_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    /// ASR confidence in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl SpeechAnalyticsSnapshot {
    /// Snapshot used when the client sent no speech data for a response.
    pub fn missing() -> Self {
        Self {
            transcript: MISSING_TRANSCRIPT.to_string(),
            filler_word_count: 0,
            speaking_rate_wpm: 0.0,
            average_pitch_hz: None,
            sentiment: None,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonVerbalSignal {
    pub label: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvaluation {
    pub question_id: String,
    /// Echo of the input transcript, never regenerated.
    pub transcript: String,
    pub overall_commentary: String,
    pub tone_analysis: String,
    pub communication_clarity: String,
    pub confidence_analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_verbal_analysis: Option<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub scores: RubricScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayEvaluation {
    pub essay_id: String,
    pub prompt: String,
    pub content: String,
    /// Counted locally from `content`; never taken from the generator.
    pub word_count: usize,
    pub overall_commentary: String,
    pub writing_clarity: String,
    pub structure_analysis: String,
    pub depth_analysis: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub scores: RubricScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewEvaluation {
    pub overall_score: f64,
    pub rubric_scores: RubricScores,
    pub responses: Vec<ResponseEvaluation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essay_evaluations: Option<Vec<EssayEvaluation>>,
}
