//! Tolerant extraction of the oracle's JSON verdict
//!
//! The oracle is asked for `{"score": <0..1>, "reason": "<text>"}` but tends
//! to wrap it in markdown fences or surround it with prose. The first
//! brace-balanced `{...}` span is taken as the payload.

use super::OracleError;
use serde_json::Value;

/// Parsed oracle verdict
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    /// Clamped to 0.0-1.0
    pub score: f64,
    pub reason: String,
}

/// Locate the first JSON object embedded in `text`
///
/// Scans from the first `{` to its matching `}`, ignoring braces inside
/// string literals. An unterminated object falls back to the last `}` in the
/// text. Returns `None` when no candidate span exists.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn score_value(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then_some(score)
}

/// Parse the oracle's candidate text into a verdict
///
/// # Errors
/// - `OracleError::Parse` if no JSON object is present, it is malformed, the
///   score is missing or non-numeric, or the reason is missing or blank
pub fn parse_verdict(text: &str) -> Result<OracleVerdict, OracleError> {
    let json = extract_json_object(text)
        .ok_or_else(|| OracleError::Parse("no JSON object in oracle response".to_string()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| OracleError::Parse(format!("invalid JSON in oracle response: {}", e)))?;

    let score = value
        .get("score")
        .and_then(score_value)
        .ok_or_else(|| OracleError::Parse("missing or non-numeric score".to_string()))?;

    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| OracleError::Parse("missing reason".to_string()))?;

    Ok(OracleVerdict {
        score: score.clamp(0.0, 1.0),
        reason: reason.to_string(),
    })
}
