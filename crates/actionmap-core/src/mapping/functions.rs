//! Value functions behind `@case`, `@replace` and `@json`
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::directive::{CaseOperator, JsonMode};
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::Value;

/// A `@replace` pattern. Patterns match literally; regex metacharacters in
/// the authored text have no special meaning.
#[derive(Debug, Clone)]
pub struct LiteralPattern {
    source: String,
    regex: Regex,
    ignore_case: bool,
    global: bool,
}

impl LiteralPattern {
    pub fn new(source: &str, ignore_case: bool, global: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&regex::escape(source))
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
            ignore_case,
            global,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.ignore_case
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn apply(&self, input: &str, replacement: &str) -> String {
        if self.global {
            self.regex.replace_all(input, NoExpand(replacement)).into_owned()
        } else {
            self.regex.replace(input, NoExpand(replacement)).into_owned()
        }
    }
}

impl PartialEq for LiteralPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.ignore_case == other.ignore_case
            && self.global == other.global
    }
}

/// One find/replace step
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceRule {
    pub pattern: LiteralPattern,
    pub replacement: String,
}

/// Apply `@case`; non-strings pass through
pub fn apply_case(operator: CaseOperator, value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(match operator {
            CaseOperator::Lower => s.to_lowercase(),
            CaseOperator::Upper => s.to_uppercase(),
        }),
        other => other,
    }
}

/// Apply `@replace` rules in order. Numbers and booleans are stringified
/// first; other non-strings pass through.
pub fn apply_replace(rules: &[ReplaceRule], value: Value) -> Value {
    let mut text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return other,
    };
    for rule in rules {
        text = rule.pattern.apply(&text, &rule.replacement);
    }
    Value::String(text)
}

/// Apply `@json`. Decoding text that is not valid JSON, or a value that is
/// not a string, returns the value unchanged.
pub fn apply_json(mode: JsonMode, value: Value) -> Value {
    match (mode, value) {
        (JsonMode::Encode, value) => Value::String(value.to_string()),
        (JsonMode::Decode, Value::String(text)) => {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        }
        (JsonMode::Decode, other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(pattern: &str, replacement: &str, ignore_case: bool, global: bool) -> ReplaceRule {
        ReplaceRule {
            pattern: LiteralPattern::new(pattern, ignore_case, global).unwrap(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_case() {
        assert_eq!(apply_case(CaseOperator::Upper, json!("Hello")), json!("HELLO"));
        assert_eq!(apply_case(CaseOperator::Lower, json!("Hello")), json!("hello"));
        assert_eq!(apply_case(CaseOperator::Lower, json!(12)), json!(12));
    }

    #[test]
    fn test_replace_is_literal() {
        let rules = [rule(".", "-", false, true)];
        assert_eq!(apply_replace(&rules, json!("a.b.c")), json!("a-b-c"));
    }

    #[test]
    fn test_replace_first_only() {
        let rules = [rule("o", "0", false, false)];
        assert_eq!(apply_replace(&rules, json!("foo")), json!("f0o"));
    }

    #[test]
    fn test_replace_ignore_case_and_second_rule() {
        let rules = [rule("HELLO", "bye", true, true), rule(" ", "_", false, true)];
        assert_eq!(apply_replace(&rules, json!("hello world")), json!("bye_world"));
    }

    #[test]
    fn test_replace_stringifies_scalars() {
        let rules = [rule("1", "one", false, true)];
        assert_eq!(apply_replace(&rules, json!(101)), json!("one0one"));
        assert_eq!(apply_replace(&rules, json!(null)), json!(null));
    }

    #[test]
    fn test_replacement_dollar_is_not_expanded() {
        let rules = [rule("x", "$1", false, true)];
        assert_eq!(apply_replace(&rules, json!("axb")), json!("a$1b"));
    }

    #[test]
    fn test_json() {
        assert_eq!(apply_json(JsonMode::Encode, json!({"a": [1]})), json!("{\"a\":[1]}"));
        assert_eq!(apply_json(JsonMode::Decode, json!("{\"a\":[1]}")), json!({"a": [1]}));
        assert_eq!(apply_json(JsonMode::Decode, json!("not json")), json!("not json"));
        assert_eq!(apply_json(JsonMode::Decode, json!(5)), json!(5));
    }
}
