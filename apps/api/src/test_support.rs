//! Scripted generation service and fixtures shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::evaluation::essay::EssayEvaluationInput;
use crate::evaluation::response::ResponseEvaluationInput;
use crate::llm_client::{GenerationService, LlmError};
use crate::models::interview::{
    EssayPrompt, InterviewQuestion, QuestionCategory, Sentiment, SpeechAnalyticsSnapshot,
};
use crate::models::profile::CandidateProfile;

enum Reply {
    Text(String),
    Fail,
}

struct Rule {
    needle: String,
    reply: Reply,
    delay: Option<Duration>,
}

/// Replies to a prompt with the first rule whose needle it contains.
/// A prompt matching no rule is answered with an API error.
#[derive(Default)]
pub struct ScriptedGenerator {
    rules: Vec<Rule>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, needle: &str, text: impl Into<String>) -> Self {
        self.rule(needle, Reply::Text(text.into()), None)
    }

    pub fn on_delayed(self, needle: &str, text: impl Into<String>, delay: Duration) -> Self {
        self.rule(needle, Reply::Text(text.into()), Some(delay))
    }

    pub fn failing(self, needle: &str) -> Self {
        self.rule(needle, Reply::Fail, None)
    }

    fn rule(mut self, needle: &str, reply: Reply, delay: Option<Duration>) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            reply,
            delay,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(rule) = self.rules.iter().find(|r| prompt.contains(&r.needle)) else {
            return Err(LlmError::Api {
                status: 500,
                message: "no scripted reply".to_string(),
            });
        };

        if let Some(delay) = rule.delay {
            tokio::time::sleep(delay).await;
        }

        match &rule.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(LlmError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

pub fn question(id: &str, prompt: &str) -> InterviewQuestion {
    InterviewQuestion {
        id: id.to_string(),
        category: QuestionCategory::Behavioral,
        prompt: prompt.to_string(),
        follow_ups: vec![],
        rubric_focus: vec!["Leadership".to_string()],
        preparation_seconds: 30,
        response_seconds: 120,
    }
}

pub fn profile() -> CandidateProfile {
    CandidateProfile {
        full_name: Some("Jordan Lee".to_string()),
        current_role: Some("Product Manager".to_string()),
        total_experience_years: Some(5.0),
        keywords: vec!["fintech".to_string()],
        summary_bullets: vec!["Launched a payments product used by 2M customers".to_string()],
        ..CandidateProfile::default()
    }
}

pub fn speech(transcript: &str) -> SpeechAnalyticsSnapshot {
    SpeechAnalyticsSnapshot {
        transcript: transcript.to_string(),
        filler_word_count: 2,
        speaking_rate_wpm: 150.0,
        average_pitch_hz: None,
        sentiment: Some(Sentiment::Positive),
        confidence: Some(0.9),
    }
}

pub fn essay_prompt(id: &str, prompt: &str) -> EssayPrompt {
    EssayPrompt {
        id: id.to_string(),
        prompt: prompt.to_string(),
        target_word_count: 300,
    }
}

pub fn response_input(question: InterviewQuestion) -> ResponseEvaluationInput {
    let transcript = format!("My answer to {}", question.id);
    ResponseEvaluationInput {
        session_id: "session-1".to_string(),
        question,
        profile: profile(),
        speech: speech(&transcript),
        non_verbal_signals: vec![],
    }
}

pub fn essay_input(prompt: EssayPrompt, content: &str) -> EssayEvaluationInput {
    EssayEvaluationInput {
        session_id: "session-1".to_string(),
        essay_prompt: prompt,
        content: content.to_string(),
        profile: profile(),
    }
}

/// A well-formed response evaluation payload with the given scores.
pub fn response_json(scores: &[(&str, f64)]) -> String {
    let rubric: serde_json::Map<String, serde_json::Value> = scores
        .iter()
        .map(|(dimension, score)| (dimension.to_string(), json!(score)))
        .collect();
    json!({
        "overall_commentary": "Solid, well-structured answer.",
        "strengths": ["Clear STAR structure"],
        "improvements": ["Quantify the outcome"],
        "rubric_scores": rubric,
        "tone_analysis": "Warm and steady.",
        "communication_clarity": "Well organised with few fillers.",
        "confidence_analysis": "Composed throughout."
    })
    .to_string()
}

/// A well-formed essay evaluation payload with the given scores.
pub fn essay_json(scores: &[(&str, f64)]) -> String {
    let rubric: serde_json::Map<String, serde_json::Value> = scores
        .iter()
        .map(|(dimension, score)| (dimension.to_string(), json!(score)))
        .collect();
    json!({
        "overall_commentary": "A reflective essay.",
        "strengths": ["Vivid opening"],
        "improvements": ["Tighten the conclusion"],
        "rubric_scores": rubric,
        "writing_clarity": "Crisp sentences.",
        "structure_analysis": "Logical flow.",
        "depth_analysis": "Genuine introspection."
    })
    .to_string()
}
