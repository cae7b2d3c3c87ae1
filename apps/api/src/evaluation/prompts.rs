// Prompt templates and context formatting for response and essay evaluation.
// Templates use `{placeholder}` markers filled in one pass by `fill_template`.

use crate::llm_client::prompts::{
    FEEDBACK_STYLE, JSON_ONLY_SYSTEM, RUBRIC_NUMERIC_RULES, SCORING_GUIDELINES,
};
use crate::models::interview::{
    EssayPrompt, InterviewQuestion, NonVerbalSignal, SpeechAnalyticsSnapshot, MISSING_TRANSCRIPT,
};
use crate::models::profile::CandidateProfile;

/// How many résumé summary bullets go into a response evaluation prompt.
const PROFILE_HIGHLIGHT_LIMIT: usize = 5;
/// Essays below this share of the target word count get a warning line.
const MIN_WORD_COUNT_RATIO: f64 = 0.8;
/// Hard ceiling for essay length.
pub const MAX_ESSAY_WORDS: usize = 500;

const RESPONSE_SYSTEM_PREAMBLE: &str = "\
You are an elite MBA admissions interviewer and coach evaluating candidates for top-tier business schools.

EVALUATION FRAMEWORK:
1. CONTENT: STAR structure, quantified outcomes, relevance to the question, self-awareness
2. COMMUNICATION CLARITY: organization, articulation, filler words, explaining complex ideas simply
3. TONE & CONFIDENCE: vocal authority, engagement, professional demeanor, pace (ideal 140-160 wpm), pitch variation
4. NON-VERBAL CUES: eye contact, presence, composure, engagement";

const RESPONSE_OUTPUT_SCHEMA: &str = r#"Return a JSON object with this EXACT structure:
{
  "overall_commentary": "comprehensive analysis of the response",
  "strengths": ["3-5 specific strengths"],
  "improvements": ["3-5 actionable improvements"],
  "rubric_scores": {
    "Leadership": 8.5,
    "Communication": 7.5,
    "Clarity": 8.0,
    "Impact": 7.0,
    "Fit": 8.5
  },
  "tone_analysis": "REQUIRED - 2-4 sentences on vocal tone, enthusiasm, pitch variation and professionalism",
  "communication_clarity": "REQUIRED - 2-4 sentences on structure, articulation and filler words",
  "confidence_analysis": "REQUIRED - 2-4 sentences on composure, authority and pace control",
  "non_verbal_analysis": "analysis of non-verbal cues when data is available"
}"#;

const ESSAY_SYSTEM_PREAMBLE: &str = "\
You are an elite MBA admissions essay reviewer evaluating written submissions for top-tier business schools.

ESSAY EVALUATION FRAMEWORK:
1. WRITING QUALITY: grammar, word choice, sentence variety, professional style
2. CLARITY: readability, precision, clarity of message and purpose
3. STRUCTURE: organization, transitions, introduction and conclusion, coherence
4. DEPTH: reflection, self-awareness, insight, connection to larger themes
5. IMPACT: memorability, emotional resonance, differentiation, fit with MBA values";

const ESSAY_OUTPUT_SCHEMA: &str = r#"Return a JSON object with this EXACT structure:
{
  "overall_commentary": "comprehensive analysis of the essay",
  "strengths": ["3-5 specific strengths"],
  "improvements": ["3-5 actionable improvements"],
  "rubric_scores": {
    "Writing Quality": 8.5,
    "Clarity": 7.5,
    "Structure": 8.0,
    "Depth": 7.0,
    "Impact": 8.5
  },
  "writing_clarity": "REQUIRED - 2-4 sentences on clarity, grammar, word choice and readability",
  "structure_analysis": "REQUIRED - 2-4 sentences on organization, flow and coherence",
  "depth_analysis": "REQUIRED - 2-4 sentences on reflection, introspection and insight"
}"#;

/// Response evaluation prompt. Replace: {category}, {question}, {focus_areas},
/// {transcript}, {speech_analytics}, {non_verbal}, {candidate_context}
pub const RESPONSE_PROMPT_TEMPLATE: &str = r#"=== INTERVIEW QUESTION ===
Category: {category}
Question: {question}{focus_areas}

=== CANDIDATE RESPONSE ===
Transcript:
{transcript}

=== SPEECH ANALYTICS ===
{speech_analytics}

=== NON-VERBAL ANALYSIS ===
{non_verbal}

=== CANDIDATE CONTEXT ===
{candidate_context}

=== EVALUATION REQUEST ===
Evaluate the response and return the JSON object described in the system prompt.
rubric_scores MUST contain numeric scores for Leadership, Communication, Clarity, Impact and Fit.
tone_analysis, communication_clarity and confidence_analysis are REQUIRED."#;

/// Essay evaluation prompt. Replace: {essay_prompt}, {target_words}, {essay},
/// {word_count}, {word_count_note}, {candidate_context}
pub const ESSAY_PROMPT_TEMPLATE: &str = r#"=== ESSAY PROMPT ===
{essay_prompt}
Target Word Count: {target_words} words

=== CANDIDATE ESSAY ===
{essay}

=== ESSAY METADATA ===
Word Count: {word_count} words
Target: {target_words} words
{word_count_note}

=== CANDIDATE CONTEXT ===
{candidate_context}

=== EVALUATION REQUEST ===
Evaluate the essay and return the JSON object described in the system prompt.
rubric_scores MUST contain numeric scores for Writing Quality, Clarity, Structure, Depth and Impact.
writing_clarity, structure_analysis and depth_analysis are REQUIRED."#;

pub fn response_system_prompt() -> String {
    [
        RESPONSE_SYSTEM_PREAMBLE,
        SCORING_GUIDELINES,
        FEEDBACK_STYLE,
        RESPONSE_OUTPUT_SCHEMA,
        RUBRIC_NUMERIC_RULES,
        JSON_ONLY_SYSTEM,
    ]
    .join("\n\n")
}

pub fn essay_system_prompt() -> String {
    [
        ESSAY_SYSTEM_PREAMBLE,
        SCORING_GUIDELINES,
        FEEDBACK_STYLE,
        ESSAY_OUTPUT_SCHEMA,
        RUBRIC_NUMERIC_RULES,
        JSON_ONLY_SYSTEM,
    ]
    .join("\n\n")
}

pub fn build_response_prompt(
    question: &InterviewQuestion,
    speech: &SpeechAnalyticsSnapshot,
    non_verbal: &[NonVerbalSignal],
    profile: &CandidateProfile,
) -> String {
    let focus_areas = if question.rubric_focus.is_empty() {
        String::new()
    } else {
        format!("\nFocus Areas: {}", question.rubric_focus.join(", "))
    };
    let transcript = if speech.transcript.trim().is_empty() {
        MISSING_TRANSCRIPT
    } else {
        speech.transcript.as_str()
    };

    fill_template(
        RESPONSE_PROMPT_TEMPLATE,
        &[
            ("category", question.category.as_str()),
            ("question", question.prompt.as_str()),
            ("focus_areas", focus_areas.as_str()),
            ("transcript", transcript),
            ("speech_analytics", format_speech_analytics(speech).as_str()),
            ("non_verbal", format_non_verbal(non_verbal).as_str()),
            ("candidate_context", format_profile_highlights(profile).as_str()),
        ],
    )
}

pub fn build_essay_prompt(
    essay_prompt: &EssayPrompt,
    essay: &str,
    word_count: usize,
    profile: &CandidateProfile,
) -> String {
    fill_template(
        ESSAY_PROMPT_TEMPLATE,
        &[
            ("essay_prompt", essay_prompt.prompt.as_str()),
            ("target_words", essay_prompt.target_word_count.to_string().as_str()),
            ("essay", essay),
            ("word_count", word_count.to_string().as_str()),
            (
                "word_count_note",
                word_count_note(word_count, essay_prompt.target_word_count).as_str(),
            ),
            ("candidate_context", format_essay_context(profile).as_str()),
        ],
    )
}

/// Replaces each `{key}` marker in `template` with its value. Inserted values
/// are never rescanned, so markers inside candidate text stay literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        filled.push_str(&rest[..start]);
        let marker = &rest[start + 1..];
        let found = values
            .iter()
            .find(|(key, _)| marker.starts_with(*key) && marker[key.len()..].starts_with('}'));
        match found {
            Some((key, value)) => {
                filled.push_str(value);
                rest = &marker[key.len() + 1..];
            }
            None => {
                filled.push('{');
                rest = marker;
            }
        }
    }
    filled.push_str(rest);
    filled
}

fn format_speech_analytics(speech: &SpeechAnalyticsSnapshot) -> String {
    let rate = if speech.speaking_rate_wpm > 0.0 {
        speech.speaking_rate_wpm.to_string()
    } else {
        "N/A".to_string()
    };

    let mut lines = vec![
        format!("Speaking Rate: {rate} words per minute"),
        format!("Filler Words: {}", speech.filler_word_count),
    ];
    if let Some(pitch) = speech.average_pitch_hz.filter(|p| *p > 0.0) {
        lines.push(format!("Average Pitch: {pitch} Hz"));
    }
    if let Some(sentiment) = speech.sentiment {
        lines.push(format!("Sentiment: {}", sentiment.as_str()));
    }
    if let Some(confidence) = speech.confidence.filter(|c| *c > 0.0) {
        lines.push(format!(
            "Speech Recognition Confidence: {:.1}%",
            confidence * 100.0
        ));
    }
    lines.join("\n")
}

fn format_non_verbal(signals: &[NonVerbalSignal]) -> String {
    if signals.is_empty() {
        return "No non-verbal data available".to_string();
    }
    signals
        .iter()
        .map(|signal| match signal.notes.as_deref().filter(|n| !n.is_empty()) {
            Some(notes) => format!("{}: {}/10 ({notes})", signal.label, signal.score),
            None => format!("{}: {}/10", signal.label, signal.score),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_profile_highlights(profile: &CandidateProfile) -> String {
    if profile.summary_bullets.is_empty() {
        return "No background context".to_string();
    }
    let highlights: Vec<&str> = profile
        .summary_bullets
        .iter()
        .take(PROFILE_HIGHLIGHT_LIMIT)
        .map(String::as_str)
        .collect();
    format!("Background Highlights:\n{}", highlights.join("\n"))
}

fn format_essay_context(profile: &CandidateProfile) -> String {
    let mut lines = Vec::new();
    if let Some(name) = profile.full_name.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Name: {name}"));
    }
    if let Some(role) = profile.current_role.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Current Role: {role}"));
    }
    if let Some(years) = profile.total_experience_years {
        lines.push(format!("Experience: {years} years"));
    }
    if !profile.summary_bullets.is_empty() {
        lines.push(format!("Summary: {}", profile.summary_bullets.join("; ")));
    }
    if !profile.keywords.is_empty() {
        lines.push(format!("Key Strengths: {}", profile.keywords.join(", ")));
    }

    if lines.is_empty() {
        "No background context".to_string()
    } else {
        lines.join("\n")
    }
}

fn word_count_note(word_count: usize, target: u32) -> String {
    let minimum = f64::from(target) * MIN_WORD_COUNT_RATIO;
    if (word_count as f64) < minimum {
        format!(
            "Warning: Essay is below minimum word count ({} words)",
            minimum.floor()
        )
    } else if word_count > MAX_ESSAY_WORDS {
        format!("Warning: Essay exceeds maximum word count ({MAX_ESSAY_WORDS} words)")
    } else {
        "Word count is within acceptable range".to_string()
    }
}
