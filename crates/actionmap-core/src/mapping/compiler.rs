//! Mapping compiler
//!
//! Walks authored mapping JSON once, validates every directive and produces
//! the [`Node`] tree the resolver evaluates. Errors are collected rather than
//! returned on first sight so a mapping author sees every problem at once,
//! each tagged with its location (`/user/@if`).
//!
//! In [`StrictMode::Strict`] any error fails the compile. In
//! [`StrictMode::Lenient`] each error is logged and the offending directive
//! object is kept as a literal value, so evaluation stays total.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::directive::{
    type_name, CaseOperator, Conditional, Directive, DirectiveKind, JsonMode, Node, Operand,
    Predicate, Replacement,
};
use super::functions::{LiteralPattern, ReplaceRule};
use super::path::FieldPath;
use super::template::Template;
use crate::config::{EngineConfig, StrictMode};
use crate::error::{Result, ValidationError, ValidationErrors};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Key allowed next to a directive key without making the object ambiguous
const METADATA_KEY: &str = "_metadata";

/// Output of a successful compile
#[derive(Debug, Clone)]
pub struct Compiled {
    pub root: Node,
    /// Problems tolerated by a lenient compile
    pub diagnostics: ValidationErrors,
}

/// Single-use compiler for one mapping
pub struct Compiler<'c> {
    config: &'c EngineConfig,
    errors: ValidationErrors,
    stack: Vec<String>,
}

impl<'c> Compiler<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self {
            config,
            errors: ValidationErrors::new(),
            stack: Vec::new(),
        }
    }

    /// Compile authored JSON into a node tree
    pub fn compile(mut self, mapping: &Value) -> Result<Compiled> {
        let root = self.compile_value(mapping, 0);

        debug!(
            errors = self.errors.len(),
            mode = %self.config.strict_mode,
            "Mapping compiled"
        );

        if !self.errors.is_empty() && self.config.strict_mode == StrictMode::Strict {
            return Err(self.errors.into());
        }

        Ok(Compiled {
            root,
            diagnostics: self.errors,
        })
    }

    fn report(&mut self, message: impl Into<String>) {
        let error = ValidationError::new(message, &self.stack);
        if self.config.strict_mode == StrictMode::Lenient {
            warn!(location = %error.location(), "{}; keeping value as a literal", error.message);
        }
        self.errors.push(error);
    }

    fn nested<F>(&mut self, segment: impl Into<String>, f: F) -> Node
    where
        F: FnOnce(&mut Self) -> Node,
    {
        self.stack.push(segment.into());
        let node = f(self);
        self.stack.pop();
        node
    }

    fn compile_value(&mut self, value: &Value, depth: usize) -> Node {
        if depth > self.config.max_depth {
            self.report(format!(
                "exceeds the maximum nesting depth of {}",
                self.config.max_depth
            ));
            return Node::Value(value.clone());
        }

        match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('@')) => {
                self.compile_directive(obj, depth)
            }
            Value::Object(obj) => self.compile_object(obj, depth),
            Value::Array(items) => Node::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.nested(i.to_string(), |c| c.compile_value(item, depth + 1)))
                    .collect(),
            ),
            other => Node::Value(other.clone()),
        }
    }

    fn compile_object(&mut self, obj: &Map<String, Value>, depth: usize) -> Node {
        Node::Object(
            obj.iter()
                .map(|(key, value)| {
                    let node = self.nested(key.as_str(), |c| c.compile_value(value, depth + 1));
                    (key.clone(), node)
                })
                .collect(),
        )
    }

    fn compile_directive(&mut self, obj: &Map<String, Value>, depth: usize) -> Node {
        let Some(kind) = DirectiveKind::detect(obj) else {
            let unknown = obj.keys().find(|k| k.starts_with('@')).cloned().unwrap_or_default();
            self.report(format!("has an invalid directive: {}", unknown));
            return self.compile_object(obj, depth);
        };

        let directive_keys = obj.keys().filter(|k| k.starts_with('@')).count();
        if directive_keys > 1 {
            self.report(format!(
                "should only have one @-prefixed key but it has {} keys",
                directive_keys
            ));
        }
        let extra: Vec<&String> = obj
            .keys()
            .filter(|k| !k.starts_with('@') && k.as_str() != METADATA_KEY)
            .collect();
        if !extra.is_empty() {
            self.report(format!(
                "shouldn't have other keys next to {} but it has {}",
                kind,
                quoted_list(&extra)
            ));
        }

        let raw = &obj[kind.key()];
        self.stack.push(kind.key().to_string());
        let directive = self.compile_kind(kind, raw, depth + 1);
        self.stack.pop();

        match directive {
            Some(directive) => Node::directive(directive),
            // Directive shape could not be understood: keep the authored object verbatim
            None => Node::Value(Value::Object(obj.clone())),
        }
    }

    fn compile_kind(&mut self, kind: DirectiveKind, raw: &Value, depth: usize) -> Option<Directive> {
        match kind {
            DirectiveKind::Path => self
                .string_or_directive(raw, depth)
                .map(|operand| Directive::Path(map_static(operand, |s| FieldPath::parse(&s)))),
            DirectiveKind::Template => self
                .string_or_directive(raw, depth)
                .map(|operand| Directive::Template(map_static(operand, |s| Template::parse(&s)))),
            DirectiveKind::Literal => Some(Directive::Literal(raw.clone())),
            DirectiveKind::If => self.compile_if(raw, depth).map(Directive::If),
            DirectiveKind::ArrayPath => self.compile_array_path(raw, depth),
            DirectiveKind::Case => self.compile_case(raw, depth),
            DirectiveKind::Replace => self.compile_replace(raw, depth).map(Directive::Replace),
            DirectiveKind::Json => self.compile_json(raw, depth),
        }
    }

    fn string_or_directive(&mut self, raw: &Value, depth: usize) -> Option<Operand<String>> {
        match raw {
            Value::String(s) => Some(Operand::Static(s.clone())),
            Value::Object(obj) if DirectiveKind::detect(obj).is_some() => {
                Some(Operand::Dynamic(self.compile_value(raw, depth)))
            }
            other => {
                let found = type_name(other);
                self.report(format!(
                    "should be a string or a mapping directive but it is {} {}",
                    indefinite_article(found),
                    found
                ));
                None
            }
        }
    }

    fn expect_object<'v>(&mut self, raw: &'v Value) -> Option<&'v Map<String, Value>> {
        match raw {
            Value::Object(obj) if DirectiveKind::detect(obj).is_none() => Some(obj),
            other => {
                let found = type_name(other);
                self.report(format!(
                    "should be an object but it is {} {}",
                    indefinite_article(found),
                    found
                ));
                None
            }
        }
    }

    fn required_value(&mut self, obj: &Map<String, Value>, depth: usize) -> Option<Node> {
        match obj.get("value") {
            Some(value) => Some(self.nested("value", |c| c.compile_value(value, depth + 1))),
            None => {
                self.report("should have field \"value\" but it doesn't");
                None
            }
        }
    }

    fn optional_node(&mut self, obj: &Map<String, Value>, key: &str, depth: usize) -> Option<Node> {
        obj.get(key)
            .map(|value| self.nested(key, |c| c.compile_value(value, depth + 1)))
    }

    fn compile_if(&mut self, raw: &Value, depth: usize) -> Option<Conditional> {
        let obj = self.expect_object(raw)?;

        let predicate = match (obj.get("exists"), obj.get("blank")) {
            (Some(exists), None) => Predicate::Exists(
                self.nested("exists", |c| c.compile_value(exists, depth + 1)),
            ),
            (None, Some(blank)) => {
                Predicate::Blank(self.nested("blank", |c| c.compile_value(blank, depth + 1)))
            }
            (Some(_), Some(_)) => {
                self.report("should have exactly one of \"exists\" or \"blank\" but it has both");
                return None;
            }
            (None, None) => {
                self.report("should have exactly one of \"exists\" or \"blank\" but it has neither");
                return None;
            }
        };

        Some(Conditional {
            predicate,
            then: self.optional_node(obj, "then", depth),
            otherwise: self.optional_node(obj, "else", depth),
        })
    }

    fn compile_array_path(&mut self, raw: &Value, depth: usize) -> Option<Directive> {
        let items = match raw {
            Value::Array(items) if (1..=2).contains(&items.len()) => items,
            Value::Array(items) => {
                self.report(format!(
                    "should have one or two elements but it has {}",
                    items.len()
                ));
                return None;
            }
            other => {
                let found = type_name(other);
                self.report(format!(
                    "should be an array of one or two elements but it is {} {}",
                    indefinite_article(found),
                    found
                ));
                return None;
            }
        };

        let source = match &items[0] {
            Value::String(path) => Operand::Static(FieldPath::parse(path)),
            Value::Object(obj) if DirectiveKind::detect(obj).is_some() => {
                Operand::Dynamic(self.nested("0", |c| c.compile_value(&items[0], depth + 1)))
            }
            other => {
                let found = type_name(other);
                self.stack.push("0".to_string());
                self.report(format!(
                    "should be a string or a mapping directive but it is {} {}",
                    indefinite_article(found),
                    found
                ));
                self.stack.pop();
                return None;
            }
        };

        let item = items
            .get(1)
            .map(|shape| self.nested("1", |c| c.compile_value(shape, depth + 1)));

        Some(Directive::ArrayPath { source, item })
    }

    fn compile_case(&mut self, raw: &Value, depth: usize) -> Option<Directive> {
        let obj = self.expect_object(raw)?;
        let operator = obj
            .get("operator")
            .and_then(Value::as_str)
            .and_then(CaseOperator::parse);
        let Some(operator) = operator else {
            self.report("should have field \"operator\" set to \"lower\" or \"upper\"");
            return None;
        };
        let value = self.required_value(obj, depth)?;
        Some(Directive::Case { operator, value })
    }

    fn compile_json(&mut self, raw: &Value, depth: usize) -> Option<Directive> {
        let obj = self.expect_object(raw)?;
        let mode = obj.get("mode").and_then(Value::as_str).and_then(JsonMode::parse);
        let Some(mode) = mode else {
            self.report("should have field \"mode\" set to \"encode\" or \"decode\"");
            return None;
        };
        let value = self.required_value(obj, depth)?;
        Some(Directive::Json { mode, value })
    }

    fn compile_replace(&mut self, raw: &Value, depth: usize) -> Option<Replacement> {
        let obj = self.expect_object(raw)?;

        let Some(pattern) = self.optional_string(obj, "pattern") else {
            if !obj.contains_key("pattern") {
                self.report("should have field \"pattern\" but it doesn't");
            }
            return None;
        };
        let replacement = self.optional_string(obj, "replacement").unwrap_or_default();
        let second = self.optional_string(obj, "pattern2");
        let replacement2 = self.optional_string(obj, "replacement2").unwrap_or_default();
        let ignore_case = self.optional_bool(obj, "ignorecase").unwrap_or(false);
        let global = self.optional_bool(obj, "global").unwrap_or(true);

        let mut steps = vec![(pattern, replacement)];
        steps.extend(second.map(|p| (p, replacement2)));

        let mut rules = Vec::with_capacity(steps.len());
        for (pattern, replacement) in steps {
            match LiteralPattern::new(&pattern, ignore_case, global) {
                Ok(pattern) => rules.push(ReplaceRule {
                    pattern,
                    replacement,
                }),
                Err(e) => {
                    self.report(format!("has a pattern that cannot be compiled: {}", e));
                    return None;
                }
            }
        }

        let value = self.required_value(obj, depth)?;
        Some(Replacement { rules, value })
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        match obj.get(key) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                let found = type_name(other);
                self.report(format!(
                    "should have a string \"{}\" but it is {} {}",
                    key,
                    indefinite_article(found),
                    found
                ));
                None
            }
        }
    }

    fn optional_bool(&mut self, obj: &Map<String, Value>, key: &str) -> Option<bool> {
        match obj.get(key) {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                let found = type_name(other);
                self.report(format!(
                    "should have a boolean \"{}\" but it is {} {}",
                    key,
                    indefinite_article(found),
                    found
                ));
                None
            }
        }
    }
}

fn map_static<T>(operand: Operand<String>, f: impl FnOnce(String) -> T) -> Operand<T> {
    match operand {
        Operand::Static(s) => Operand::Static(f(s)),
        Operand::Dynamic(node) => Operand::Dynamic(node),
    }
}

fn quoted_list(keys: &[&String]) -> String {
    keys.iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
