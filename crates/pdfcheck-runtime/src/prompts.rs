//! Prompt construction for rule evaluation.
//!
//! One user message per rule: the framing, the rule, at most
//! [`MAX_PROMPT_CHARS`](pdfcheck_core::MAX_PROMPT_CHARS) characters of the
//! document, and the exact JSON shape the reply must take.

use pdfcheck_core::{DocumentText, Rule};

/// Opening line of every evaluation prompt.
pub const CHECKER_FRAMING: &str = "You are a document compliance checker.";

/// Reply instructions. `{rule}` is replaced with the JSON-escaped rule.
const RESPONSE_FORMAT: &str = r#"Respond ONLY with JSON (no markdown, no backticks):
{
  "rule": {rule},
  "status": "pass" or "fail",
  "evidence": "one sentence from document",
  "reasoning": "short explanation",
  "confidence": 85
}"#;

/// Build the evaluation prompt for one rule.
pub fn build_rule_prompt(rule: &Rule, document: &DocumentText) -> String {
    format!(
        "{framing} Analyze the following document text for this rule: \"{rule}\"\n\n\
         Document text:\n{text}\n\n{format}",
        framing = CHECKER_FRAMING,
        rule = rule.as_str(),
        text = document.prompt_slice(),
        format = RESPONSE_FORMAT.replace("{rule}", &json_string(rule.as_str())),
    )
}

/// Quote a string as a JSON literal so the example reply stays valid JSON.
fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfcheck_core::MAX_PROMPT_CHARS;

    fn rule(text: &str) -> Rule {
        Rule::new(text).unwrap()
    }

    #[test]
    fn test_prompt_contains_framing_rule_and_text() {
        let prompt = build_rule_prompt(
            &rule("Contains a signature"),
            &DocumentText::new("Signed by J. Doe"),
        );

        assert!(prompt.starts_with("You are a document compliance checker."));
        assert!(prompt.contains("for this rule: \"Contains a signature\""));
        assert!(prompt.contains("Document text:\nSigned by J. Doe\n"));
        assert!(prompt.contains("\"rule\": \"Contains a signature\""));
        assert!(prompt.contains("no markdown, no backticks"));
    }

    #[test]
    fn test_prompt_lists_every_field() {
        let prompt = build_rule_prompt(&rule("r"), &DocumentText::default());
        for field in ["\"rule\"", "\"status\"", "\"evidence\"", "\"reasoning\"", "\"confidence\""] {
            assert!(prompt.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_prompt_embeds_truncated_text() {
        let body = format!("{}{}", "x".repeat(MAX_PROMPT_CHARS), "BEYOND_LIMIT");
        let prompt = build_rule_prompt(&rule("r"), &DocumentText::new(body));

        assert!(prompt.contains(&"x".repeat(MAX_PROMPT_CHARS)));
        assert!(!prompt.contains("BEYOND_LIMIT"));
    }

    #[test]
    fn test_rule_with_quotes_is_escaped_in_example() {
        let prompt = build_rule_prompt(&rule("Mentions \"Force Majeure\""), &DocumentText::default());
        assert!(prompt.contains(r#""rule": "Mentions \"Force Majeure\"""#));
    }
}
