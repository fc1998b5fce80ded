//! Rules and rule sets.
//!
//! A rule is an opaque natural-language criterion. Nothing inside it is
//! parsed; the only constraint is that it is not blank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when building or loading rules.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Enter at least one rule.")]
    NoRules,

    #[error("Rule is empty")]
    EmptyRule,

    #[error("Failed to read rules file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML rules: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON rules: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A single compliance rule.
///
/// The original text is kept verbatim (including surrounding whitespace)
/// so that verdicts echo exactly what the user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rule(String);

impl Rule {
    /// Create a rule, rejecting text that is blank after trimming.
    pub fn new(text: impl Into<String>) -> Result<Self, RuleError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RuleError::EmptyRule);
        }
        Ok(Self(text))
    }

    /// The rule text as submitted.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Rule {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rule::new(value)
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.0
    }
}

impl AsRef<str> for Rule {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered, non-empty list of rules.
///
/// Blank entries in the input are dropped silently; they are never
/// reported as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

/// Rules file shape accepted in addition to a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum RulesDocument {
    List(Vec<String>),
    Object { rules: Vec<String> },
}

impl RulesDocument {
    fn into_vec(self) -> Vec<String> {
        match self {
            RulesDocument::List(rules) => rules,
            RulesDocument::Object { rules } => rules,
        }
    }
}

impl RuleSet {
    /// Build a rule set from raw strings, dropping blank entries.
    ///
    /// Fails with [`RuleError::NoRules`] if nothing survives.
    pub fn from_raw<I, S>(raw: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules: Vec<Rule> = raw
            .into_iter()
            .filter_map(|s| Rule::new(s).ok())
            .collect();

        if rules.is_empty() {
            return Err(RuleError::NoRules);
        }

        Ok(Self { rules })
    }

    /// Parse rules from YAML: a list of strings or `rules: [...]`.
    pub fn from_yaml(yaml: &str) -> Result<Self, RuleError> {
        let doc: RulesDocument = serde_yaml::from_str(yaml)?;
        Self::from_raw(doc.into_vec())
    }

    /// Parse rules from JSON: an array of strings or `{"rules": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let doc: RulesDocument = serde_json::from_str(json)?;
        Self::from_raw(doc.into_vec())
    }

    /// Parse rules from plain text, one rule per line.
    pub fn from_lines(text: &str) -> Result<Self, RuleError> {
        Self::from_raw(text.lines())
    }

    /// Load rules from a file, choosing the format from its extension.
    ///
    /// `.yaml`/`.yml` and `.json` are parsed structurally; anything else is
    /// read as one rule per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        Self::from_raw(Self::raw_from_file(path)?)
    }

    /// Read a rules file without filtering, blank entries included.
    ///
    /// Lets callers merge several sources before the non-empty check.
    pub fn raw_from_file(path: impl AsRef<Path>) -> Result<Vec<String>, RuleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        Ok(match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str::<RulesDocument>(&content)?.into_vec(),
            Some("json") => serde_json::from_str::<RulesDocument>(&content)?.into_vec(),
            _ => content.lines().map(str::to_string).collect(),
        })
    }

    /// Append more rules, dropping blank entries.
    pub fn extend<I, S>(&mut self, raw: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .extend(raw.into_iter().filter_map(|s| Rule::new(s).ok()));
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false; a rule set holds at least one rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// The rules as a slice.
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blank_rule_rejected() {
        assert!(matches!(Rule::new("   \t"), Err(RuleError::EmptyRule)));
        assert!(matches!(Rule::new(""), Err(RuleError::EmptyRule)));
    }

    #[test]
    fn test_rule_text_kept_verbatim() {
        let rule = Rule::new("  Contains a signature ").unwrap();
        assert_eq!(rule.as_str(), "  Contains a signature ");
    }

    #[test]
    fn test_blank_entries_dropped_in_order() {
        let rules = RuleSet::from_raw(["Has a date", "", "  ", "Has a signature"]).unwrap();
        let texts: Vec<&str> = rules.iter().map(Rule::as_str).collect();
        assert_eq!(texts, vec!["Has a date", "Has a signature"]);
    }

    #[test]
    fn test_all_blank_is_error() {
        let err = RuleSet::from_raw(["", " ", "\n"]).unwrap_err();
        assert!(matches!(err, RuleError::NoRules));
        assert_eq!(err.to_string(), "Enter at least one rule.");
    }

    #[test]
    fn test_from_yaml_list_and_object() {
        let list = RuleSet::from_yaml("- Has a date\n- Has a signature\n").unwrap();
        assert_eq!(list.len(), 2);

        let object = RuleSet::from_yaml("rules:\n  - Has a date\n  - \"\"\n").unwrap();
        assert_eq!(object.len(), 1);
    }

    #[test]
    fn test_from_json_list_and_object() {
        let list = RuleSet::from_json(r#"["A", "B", " "]"#).unwrap();
        assert_eq!(list.len(), 2);

        let object = RuleSet::from_json(r#"{"rules": ["A"]}"#).unwrap();
        assert_eq!(object.as_slice()[0].as_str(), "A");
    }

    #[test]
    fn test_from_lines() {
        let rules = RuleSet::from_lines("Has a date\n\nHas a signature\n").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_raw_from_file_keeps_blank_lines() {
        let path = std::env::temp_dir().join(format!("pdfcheck-raw-{}.txt", std::process::id()));
        fs::write(&path, "\n  \nHas a date\n").unwrap();

        let raw = RuleSet::raw_from_file(&path).unwrap();
        let loaded = RuleSet::from_file(&path).map(|rules| rules.len());
        fs::remove_file(&path).ok();

        assert_eq!(raw, vec!["", "  ", "Has a date"]);
        assert_eq!(loaded.unwrap(), 1);
    }

    #[test]
    fn test_rule_deserialize_rejects_blank() {
        let ok: Result<Rule, _> = serde_json::from_str(r#""Has a date""#);
        assert!(ok.is_ok());

        let blank: Result<Rule, _> = serde_json::from_str(r#""  ""#);
        assert!(blank.is_err());
    }

    proptest! {
        #[test]
        fn prop_rule_set_keeps_exactly_non_blank(raw in prop::collection::vec("[ a-z\t]{0,8}", 1..20)) {
            let expected: Vec<String> = raw
                .iter()
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .collect();

            match RuleSet::from_raw(raw.clone()) {
                Ok(rules) => {
                    let got: Vec<String> = rules.iter().map(|r| r.as_str().to_string()).collect();
                    prop_assert_eq!(got, expected);
                }
                Err(RuleError::NoRules) => prop_assert!(expected.is_empty()),
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
        }
    }
}
