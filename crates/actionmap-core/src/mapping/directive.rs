//! Compiled directive model
//!
//! Authored mappings are loosely typed JSON where a directive is any object
//! holding one of the reserved `@`-keys. The compiler turns that JSON into the
//! tagged tree below once, so evaluation never re-inspects key membership.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::functions::ReplaceRule;
use super::path::FieldPath;
use super::template::Template;
use serde_json::{Map, Value};
use std::fmt;

/// Directive variants, listed in the order used to break ties when an
/// object carries more than one reserved key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    ArrayPath,
    Case,
    If,
    Literal,
    Path,
    Replace,
    Template,
    Json,
}

impl DirectiveKind {
    /// Every kind in priority order
    pub const PRIORITY: [DirectiveKind; 8] = [
        DirectiveKind::ArrayPath,
        DirectiveKind::Case,
        DirectiveKind::If,
        DirectiveKind::Literal,
        DirectiveKind::Path,
        DirectiveKind::Replace,
        DirectiveKind::Template,
        DirectiveKind::Json,
    ];

    /// Reserved key that introduces this directive
    pub fn key(self) -> &'static str {
        match self {
            DirectiveKind::ArrayPath => "@arrayPath",
            DirectiveKind::Case => "@case",
            DirectiveKind::If => "@if",
            DirectiveKind::Literal => "@literal",
            DirectiveKind::Path => "@path",
            DirectiveKind::Replace => "@replace",
            DirectiveKind::Template => "@template",
            DirectiveKind::Json => "@json",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|kind| kind.key() == key)
    }

    /// First reserved key present on `obj`, by priority
    pub fn detect(obj: &Map<String, Value>) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|kind| obj.contains_key(kind.key()))
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Whether a raw JSON value is a directive object
pub fn is_directive(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| DirectiveKind::detect(obj).is_some())
}

/// A compiled mapping node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw JSON used verbatim: primitives, and anything a lenient compile
    /// could not interpret
    Value(Value),
    /// Plain output object; keys keep their authored order
    Object(Vec<(String, Node)>),
    /// Plain output array
    Array(Vec<Node>),
    Directive(Box<Directive>),
}

impl Node {
    pub fn directive(directive: Directive) -> Self {
        Node::Directive(Box::new(directive))
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Node::Directive(directive) => Some(directive),
            _ => None,
        }
    }
}

/// Operand that is either fixed at compile time or computed by a directive
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<T> {
    Static(T),
    Dynamic(Node),
}

/// String operator for `@case`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOperator {
    Lower,
    Upper,
}

impl CaseOperator {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "lower" => Some(CaseOperator::Lower),
            "upper" => Some(CaseOperator::Upper),
            _ => None,
        }
    }
}

/// Direction for `@json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonMode {
    Encode,
    Decode,
}

impl JsonMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "encode" => Some(JsonMode::Encode),
            "decode" => Some(JsonMode::Decode),
            _ => None,
        }
    }
}

/// Predicate of an `@if`
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Holds when the operand is present and not null
    Exists(Node),
    /// Holds when the operand is absent, null or an empty string
    Blank(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub predicate: Predicate,
    pub then: Option<Node>,
    pub otherwise: Option<Node>,
}

/// Find/replace steps of a `@replace`, applied in order
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub rules: Vec<ReplaceRule>,
    pub value: Node,
}

/// A compiled directive
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Path(Operand<FieldPath>),
    Template(Operand<Template>),
    Literal(Value),
    If(Conditional),
    ArrayPath {
        /// A static path, or a directive whose value is the array itself
        source: Operand<FieldPath>,
        item: Option<Node>,
    },
    Case {
        operator: CaseOperator,
        value: Node,
    },
    Replace(Replacement),
    Json {
        mode: JsonMode,
        value: Node,
    },
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Path(_) => DirectiveKind::Path,
            Directive::Template(_) => DirectiveKind::Template,
            Directive::Literal(_) => DirectiveKind::Literal,
            Directive::If(_) => DirectiveKind::If,
            Directive::ArrayPath { .. } => DirectiveKind::ArrayPath,
            Directive::Case { .. } => DirectiveKind::Case,
            Directive::Replace(_) => DirectiveKind::Replace,
            Directive::Json { .. } => DirectiveKind::Json,
        }
    }
}

/// JSON type name used in diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(obj) if DirectiveKind::detect(obj).is_some() => "directive",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_directive() {
        assert!(is_directive(&json!({"@path": "$.a"})));
        assert!(is_directive(&json!({"@literal": null})));
        assert!(!is_directive(&json!({"path": "$.a"})));
        assert!(!is_directive(&json!({"@unknown": 1})));
        assert!(!is_directive(&json!(["@path"])));
        assert!(!is_directive(&Value::Null));
    }

    #[test]
    fn test_detect_priority() {
        let obj = json!({"@template": "x", "@path": "$.a", "@if": {}});
        let obj = obj.as_object().unwrap();
        assert_eq!(DirectiveKind::detect(obj), Some(DirectiveKind::If));
    }

    #[test]
    fn test_key_round_trip() {
        for kind in DirectiveKind::PRIORITY {
            assert_eq!(DirectiveKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(DirectiveKind::from_key("@merge"), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&json!(1)), "number");
        assert_eq!(type_name(&json!({"@path": "$"})), "directive");
        assert_eq!(type_name(&json!({})), "object");
    }
}
