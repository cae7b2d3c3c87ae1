// Shared prompt fragments used by more than one evaluator.
// Each evaluator keeps its own templates in evaluation/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "Return ONLY a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Scoring scale shared by interview and essay rubrics.
pub const SCORING_GUIDELINES: &str = "\
SCORING GUIDELINES:
- Score each rubric dimension from 0 to 10 (decimals allowed)
- 9-10: Exceptional, admission-competitive
- 7-8: Strong, with minor improvements needed
- 5-6: Adequate, significant room for growth
- 3-4: Weak, needs substantial work
- 0-2: Very weak, fundamental issues";

/// Hard rules for the `rubric_scores` object. The parser repairs violations,
/// but every repair costs signal, so the model is told up front.
pub const RUBRIC_NUMERIC_RULES: &str = "\
RUBRIC SCORE RULES:
- Every value in \"rubric_scores\" MUST be a JSON number such as 8.5 or 7.0
- Never use strings, null, NaN, Infinity or words like \"high\"
- Every score MUST be between 0 and 10 inclusive
- If a score cannot be determined, use 5.0
- Do NOT omit any of the listed dimensions";

/// Feedback tone shared by all evaluators.
pub const FEEDBACK_STYLE: &str = "\
FEEDBACK STYLE:
- Be specific and actionable, citing exact moments or passages
- Balance criticism with strengths
- Reference the candidate's background when relevant
- Be direct but constructive";
