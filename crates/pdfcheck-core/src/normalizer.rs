//! Response normalization: raw model text to [`Verdict`].
//!
//! Models are asked for a bare JSON object but often wrap it in markdown
//! code fences. The normalizer strips those, decodes the object and, when
//! that fails, substitutes the deterministic fallback verdict.
//!
//! Two decode modes exist. [`DecodeMode::Permissive`] only requires a JSON
//! object and maps fields leniently. [`DecodeMode::Strict`] also requires a
//! `status` of exactly `pass`/`fail` and a confidence within 0..=100.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::types::{Status, Verdict};

lazy_static! {
    static ref FENCE_PATTERN: Regex = Regex::new(r"```json\n?|```\n?").unwrap();
}

/// Errors from decoding model output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Model returned an empty response")]
    Empty,

    #[error("Model response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Model response is not a JSON object (got {0})")]
    NotAnObject(&'static str),

    #[error("Invalid status '{0}': expected \"pass\" or \"fail\"")]
    InvalidStatus(String),

    #[error("Invalid confidence {0}: expected an integer between 0 and 100")]
    InvalidConfidence(String),

    #[error("Missing field '{0}'")]
    MissingField(&'static str),
}

/// How much to trust the decoded fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Accept any JSON object; no semantic validation.
    #[default]
    Permissive,
    /// Reject unknown statuses and out-of-range confidences.
    Strict,
}

/// Remove code-fence markers anywhere in the text, then trim.
pub fn strip_fences(raw: &str) -> String {
    FENCE_PATTERN.replace_all(raw, "").trim().to_string()
}

/// Decode raw model output into a verdict for `rule`.
pub fn decode(raw: &str, rule: &str, mode: DecodeMode) -> Result<Verdict, DecodeError> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value: JsonValue =
        serde_json::from_str(&cleaned).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    let object = match value {
        JsonValue::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(json_kind(&other))),
    };

    match mode {
        DecodeMode::Permissive => Ok(permissive_verdict(&object, rule)),
        DecodeMode::Strict => strict_verdict(&object, rule),
    }
}

/// Decode raw model output, falling back to the deterministic failure
/// verdict when decoding fails.
pub fn normalize(raw: &str, rule: &str, mode: DecodeMode) -> Verdict {
    decode(raw, rule, mode).unwrap_or_else(|e| {
        tracing::warn!(rule = %rule, error = %e, "Could not decode model response");
        Verdict::fallback(rule, e.to_string())
    })
}

fn permissive_verdict(object: &Map<String, JsonValue>, rule: &str) -> Verdict {
    let status = match object.get("status").and_then(JsonValue::as_str) {
        Some(s) if s.trim().eq_ignore_ascii_case("pass") => Status::Pass,
        _ => Status::Fail,
    };

    Verdict {
        rule: object
            .get("rule")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| rule.to_string()),
        status,
        evidence: text_field(object, "evidence"),
        reasoning: text_field(object, "reasoning"),
        confidence: object
            .get("confidence")
            .and_then(confidence_value)
            .unwrap_or(0),
    }
}

fn strict_verdict(object: &Map<String, JsonValue>, rule: &str) -> Result<Verdict, DecodeError> {
    let status = match object.get("status") {
        Some(JsonValue::String(s)) if s == "pass" => Status::Pass,
        Some(JsonValue::String(s)) if s == "fail" => Status::Fail,
        Some(other) => return Err(DecodeError::InvalidStatus(display_json(other))),
        None => return Err(DecodeError::MissingField("status")),
    };

    let confidence = match object.get("confidence") {
        Some(value @ JsonValue::Number(_)) => match confidence_value(value) {
            Some(c) if (0..=100).contains(&c) => c,
            _ => return Err(DecodeError::InvalidConfidence(value.to_string())),
        },
        Some(other) => return Err(DecodeError::InvalidConfidence(other.to_string())),
        None => return Err(DecodeError::MissingField("confidence")),
    };

    let mut verdict = permissive_verdict(object, rule);
    verdict.status = status;
    verdict.confidence = confidence;
    Ok(verdict)
}

/// Read a free-text field. Missing is empty; non-strings render as JSON.
fn text_field(object: &Map<String, JsonValue>, key: &str) -> String {
    match object.get(key) {
        None | Some(JsonValue::Null) => String::new(),
        Some(value) => display_json(value),
    }
}

fn display_json(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer confidence from a number or numeric string. Fractions round.
fn confidence_value(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        JsonValue::String(s) => {
            let s = s.trim().trim_end_matches('%');
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE_REPLY: &str = r#"{"rule":"Contains a signature","status":"pass","evidence":"Signed by J. Doe","reasoning":"Signature block found","confidence":90}"#;

    fn signature_verdict() -> Verdict {
        Verdict {
            rule: "Contains a signature".to_string(),
            status: Status::Pass,
            evidence: "Signed by J. Doe".to_string(),
            reasoning: "Signature block found".to_string(),
            confidence: 90,
        }
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_decode_exact_reply() {
        let verdict = decode(SIGNATURE_REPLY, "Contains a signature", DecodeMode::Permissive);
        assert_eq!(verdict.unwrap(), signature_verdict());
    }

    #[test]
    fn test_decode_fenced_reply() {
        let fenced = format!("```json\n{}\n```", SIGNATURE_REPLY);
        let verdict = decode(&fenced, "Contains a signature", DecodeMode::Permissive).unwrap();
        assert_eq!(verdict, signature_verdict());
    }

    #[test]
    fn test_non_json_falls_back() {
        let verdict = normalize(
            "I think the document is signed.",
            "Contains a signature",
            DecodeMode::Permissive,
        );
        assert!(verdict.is_fallback());
        assert_eq!(verdict.rule, "Contains a signature");
        assert!(verdict.reasoning.contains("not valid JSON"));
    }

    #[test]
    fn test_array_is_not_an_object() {
        let err = decode("[1, 2]", "r", DecodeMode::Permissive).unwrap_err();
        assert_eq!(err, DecodeError::NotAnObject("array"));
    }

    #[test]
    fn test_empty_reply() {
        let err = decode("```json\n```", "r", DecodeMode::Permissive).unwrap_err();
        assert_eq!(err, DecodeError::Empty);
    }

    #[test]
    fn test_permissive_fills_missing_fields() {
        let verdict = decode(r#"{"status":"PASS"}"#, "Has a date", DecodeMode::Permissive).unwrap();
        assert_eq!(verdict.rule, "Has a date");
        assert_eq!(verdict.status, Status::Pass);
        assert_eq!(verdict.evidence, "");
        assert_eq!(verdict.reasoning, "");
        assert_eq!(verdict.confidence, 0);
    }

    #[test]
    fn test_permissive_keeps_out_of_range_confidence() {
        let verdict = decode(
            r#"{"status":"maybe","confidence":150}"#,
            "r",
            DecodeMode::Permissive,
        )
        .unwrap();
        assert_eq!(verdict.status, Status::Fail);
        assert_eq!(verdict.confidence, 150);
    }

    #[test]
    fn test_permissive_confidence_variants() {
        let rounded = decode(r#"{"confidence":84.6}"#, "r", DecodeMode::Permissive).unwrap();
        assert_eq!(rounded.confidence, 85);

        let text = decode(r#"{"confidence":"70%"}"#, "r", DecodeMode::Permissive).unwrap();
        assert_eq!(text.confidence, 70);

        let junk = decode(r#"{"confidence":"high"}"#, "r", DecodeMode::Permissive).unwrap();
        assert_eq!(junk.confidence, 0);
    }

    #[test]
    fn test_non_string_evidence_rendered() {
        let verdict = decode(
            r#"{"evidence":["a","b"],"reasoning":null}"#,
            "r",
            DecodeMode::Permissive,
        )
        .unwrap();
        assert_eq!(verdict.evidence, r#"["a","b"]"#);
        assert_eq!(verdict.reasoning, "");
    }

    #[test]
    fn test_strict_accepts_well_formed() {
        let verdict = decode(SIGNATURE_REPLY, "Contains a signature", DecodeMode::Strict).unwrap();
        assert_eq!(verdict, signature_verdict());
    }

    #[test]
    fn test_strict_rejects_unknown_status() {
        let err = decode(r#"{"status":"PASS","confidence":50}"#, "r", DecodeMode::Strict)
            .unwrap_err();
        assert_eq!(err, DecodeError::InvalidStatus("PASS".to_string()));
    }

    #[test]
    fn test_strict_rejects_out_of_range_confidence() {
        let err = decode(r#"{"status":"pass","confidence":101}"#, "r", DecodeMode::Strict)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidConfidence(_)));

        let err = decode(r#"{"status":"pass","confidence":"90"}"#, "r", DecodeMode::Strict)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidConfidence(_)));
    }

    #[test]
    fn test_strict_requires_fields() {
        let err = decode(r#"{"confidence":10}"#, "r", DecodeMode::Strict).unwrap_err();
        assert_eq!(err, DecodeError::MissingField("status"));

        let strict = normalize(r#"{"status":"pass"}"#, "r", DecodeMode::Strict);
        assert!(strict.is_fallback());
    }
}
