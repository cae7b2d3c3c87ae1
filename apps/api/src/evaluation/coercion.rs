//! Score coercion: any raw JSON value → finite score in [0, 10].

use serde_json::Value;
use tracing::warn;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;
/// Substituted for any score that is missing or unreadable.
pub const DEFAULT_SCORE: f64 = 5.0;

/// Rounds to 2 decimal places. Negative zero comes back as `0.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Converts an untrusted rubric value into a score.
///
/// - `null`, unreadable strings, non-finite numbers and non-scalar values → `fallback`
/// - numeric strings are read with a leading-number parse (`"7.5/10"` → 7.5)
/// - everything else is clamped to [0, 10]
///
/// The result is always finite, within range and rounded to 2 decimals.
pub fn coerce_score(raw: &Value, dimension: &str, fallback: f64) -> f64 {
    let fallback = if fallback.is_finite() {
        round2(fallback.clamp(MIN_SCORE, MAX_SCORE))
    } else {
        DEFAULT_SCORE
    };

    let value = match raw {
        Value::Null => {
            warn!("Rubric score for {dimension} is null, using default {fallback}");
            return fallback;
        }
        Value::Number(n) => match n.as_f64() {
            Some(v) => v,
            None => {
                warn!("Rubric score for {dimension} is not representable, using default {fallback}");
                return fallback;
            }
        },
        Value::String(s) => {
            let trimmed = s.trim();
            match parse_leading_float(trimmed).or_else(|| parse_leading_int(trimmed)) {
                Some(v) => v,
                None => {
                    warn!("Invalid rubric score string for {dimension}: {trimmed:?}, using default {fallback}");
                    return fallback;
                }
            }
        }
        other => {
            warn!(
                "Invalid rubric score type for {dimension}: {}, using default {fallback}",
                json_type_name(other)
            );
            return fallback;
        }
    };

    if !value.is_finite() {
        warn!("Non-finite rubric score for {dimension}: {value}, using default {fallback}");
        return fallback;
    }

    if value < MIN_SCORE {
        warn!("Rubric score for {dimension} below minimum: {value}, clamping to {MIN_SCORE}");
        return MIN_SCORE;
    }
    if value > MAX_SCORE {
        warn!("Rubric score for {dimension} above maximum: {value}, clamping to {MAX_SCORE}");
        return MAX_SCORE;
    }

    round2(value)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads the longest numeric prefix of `text`, the way a lenient float parser
/// does: optional sign, digits with an optional fraction, optional exponent.
/// A signed or bare `Infinity` prefix yields an infinite value.
fn parse_leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return Some(if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - end - 1;
        if frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

fn parse_leading_int(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse::<i64>().ok().map(|v| v as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(raw: Value) -> f64 {
        coerce_score(&raw, "Leadership", DEFAULT_SCORE)
    }

    #[test]
    fn test_valid_number_passes_through() {
        assert_eq!(coerce(json!(8.5)), 8.5);
        assert_eq!(coerce(json!(7)), 7.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(coerce(json!(7.456)), 7.46);
        assert_eq!(coerce(json!("6.333333")), 6.33);
    }

    #[test]
    fn test_null_uses_fallback() {
        assert_eq!(coerce(Value::Null), 5.0);
        assert_eq!(coerce_score(&Value::Null, "Fit", 6.5), 6.5);
    }

    #[test]
    fn test_numeric_string_is_parsed() {
        assert_eq!(coerce(json!("7.5")), 7.5);
        assert_eq!(coerce(json!("  9 ")), 9.0);
        assert_eq!(coerce(json!("8/10")), 8.0);
        assert_eq!(coerce(json!(".5")), 0.5);
        assert_eq!(coerce(json!("8.5 out of 10")), 8.5);
    }

    #[test]
    fn test_unreadable_string_uses_fallback() {
        assert_eq!(coerce(json!("abc")), 5.0);
        assert_eq!(coerce(json!("high")), 5.0);
        assert_eq!(coerce(json!("N/A")), 5.0);
        assert_eq!(coerce(json!("")), 5.0);
    }

    #[test]
    fn test_non_finite_strings_use_fallback() {
        assert_eq!(coerce(json!("NaN")), 5.0);
        assert_eq!(coerce(json!("Infinity")), 5.0);
        assert_eq!(coerce(json!("-Infinity")), 5.0);
        assert_eq!(coerce(json!("1e400")), 5.0);
    }

    #[test]
    fn test_non_finite_number_becomes_null_and_falls_back() {
        // serde_json cannot hold NaN/Infinity; they arrive as null.
        assert_eq!(coerce(json!(f64::NAN)), 5.0);
        assert_eq!(coerce(json!(f64::INFINITY)), 5.0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(coerce(json!(-5)), 0.0);
        assert_eq!(coerce(json!(15)), 10.0);
        assert_eq!(coerce(json!("12.5")), 10.0);
        assert_eq!(coerce(json!(10.0)), 10.0);
        assert_eq!(coerce(json!(0)), 0.0);
    }

    #[test]
    fn test_non_scalar_types_use_fallback() {
        assert_eq!(coerce(json!(true)), 5.0);
        assert_eq!(coerce(json!([8])), 5.0);
        assert_eq!(coerce(json!({"score": 8})), 5.0);
    }

    #[test]
    fn test_invalid_fallback_is_sanitized() {
        assert_eq!(coerce_score(&Value::Null, "Fit", f64::NAN), DEFAULT_SCORE);
        assert_eq!(coerce_score(&Value::Null, "Fit", 42.0), 10.0);
    }

    #[test]
    fn test_clamp_totality() {
        let inputs = vec![
            Value::Null,
            json!("abc"),
            json!("NaN"),
            json!("Infinity"),
            json!(-5),
            json!(15),
            json!("7.5"),
            json!(1e300),
            json!(-1e300),
            json!(3.14159),
            json!(false),
            json!([]),
            json!("-0"),
        ];
        for raw in inputs {
            let score = coerce(raw.clone());
            assert!(score.is_finite(), "{raw} produced {score}");
            assert!((MIN_SCORE..=MAX_SCORE).contains(&score), "{raw} produced {score}");
            assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_negative_zero_is_normalised() {
        for raw in [json!("-0"), json!(-0.0), json!("-0.001")] {
            let score = coerce(raw.clone());
            assert_eq!(score, 0.0);
            assert!(score.is_sign_positive(), "{raw} produced -0");
            assert_eq!(serde_json::to_string(&score).unwrap(), "0.0");
        }
        assert!(round2(-0.004).is_sign_positive());
    }

    #[test]
    fn test_mean_and_round2() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[8.0, 6.0]), Some(7.0));
        assert_eq!(round2(7.456), 7.46);
        assert_eq!(round2(7.6), 7.6);
    }

    #[test]
    fn test_leading_float_parser() {
        assert_eq!(parse_leading_float("-3.5e1x"), Some(-35.0));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("7e"), Some(7.0));
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_int("12abc"), Some(12.0));
        assert_eq!(parse_leading_int("abc"), None);
    }
}
