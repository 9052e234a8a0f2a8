//! Recursive evaluation of compiled mappings
//!
//! Evaluation is total and side-effect free: every lookup that fails yields
//! `None` ("absent") and absent values are left out of the enclosing object
//! or array. Only absence is filtered; `null`, `false`, `0`, `""`, `{}` and
//! `[]` are all real values.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::directive::{Conditional, Directive, Node, Operand, Predicate};
use super::functions::{apply_case, apply_json, apply_replace};
use super::path::FieldPath;
use super::template::Template;
use serde_json::{Map, Value};

/// Evaluates compiled nodes against one payload
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    escape_templates: bool,
}

impl Resolver {
    pub fn new(escape_templates: bool) -> Self {
        Self { escape_templates }
    }

    /// Resolve `node` against `payload`; `None` means absent
    pub fn resolve(&self, node: &Node, payload: &Value) -> Option<Value> {
        match node {
            Node::Value(value) => Some(value.clone()),
            Node::Object(entries) => Some(Value::Object(self.resolve_entries(entries, payload))),
            Node::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .filter_map(|item| self.resolve(item, payload))
                    .collect(),
            )),
            Node::Directive(directive) => self.resolve_directive(directive, payload),
        }
    }

    fn resolve_entries(&self, entries: &[(String, Node)], payload: &Value) -> Map<String, Value> {
        entries
            .iter()
            .filter_map(|(key, node)| self.resolve(node, payload).map(|v| (key.clone(), v)))
            .collect()
    }

    fn resolve_directive(&self, directive: &Directive, payload: &Value) -> Option<Value> {
        match directive {
            Directive::Literal(value) => Some(value.clone()),
            Directive::Path(Operand::Static(path)) => path.lookup(payload).cloned(),
            Directive::Path(Operand::Dynamic(node)) => {
                let path = self.resolve_string(node, payload)?;
                FieldPath::parse(&path).lookup(payload).cloned()
            }
            Directive::Template(Operand::Static(template)) => {
                Some(Value::String(template.render(payload, self.escape_templates)))
            }
            Directive::Template(Operand::Dynamic(node)) => {
                let source = self.resolve_string(node, payload)?;
                let template = Template::parse(&source);
                Some(Value::String(template.render(payload, self.escape_templates)))
            }
            Directive::If(conditional) => self.resolve_if(conditional, payload),
            Directive::ArrayPath { source, item } => {
                self.resolve_array_path(source, item.as_ref(), payload)
            }
            Directive::Case { operator, value } => {
                self.resolve(value, payload).map(|v| apply_case(*operator, v))
            }
            Directive::Replace(replacement) => self
                .resolve(&replacement.value, payload)
                .map(|v| apply_replace(&replacement.rules, v)),
            Directive::Json { mode, value } => {
                self.resolve(value, payload).map(|v| apply_json(*mode, v))
            }
        }
    }

    fn resolve_string(&self, node: &Node, payload: &Value) -> Option<String> {
        match self.resolve(node, payload)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn resolve_if(&self, conditional: &Conditional, payload: &Value) -> Option<Value> {
        let holds = match &conditional.predicate {
            Predicate::Exists(node) => {
                matches!(self.resolve(node, payload), Some(value) if !value.is_null())
            }
            Predicate::Blank(node) => match self.resolve(node, payload) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            },
        };

        let branch = if holds {
            conditional.then.as_ref()
        } else {
            conditional.otherwise.as_ref()
        };
        branch.and_then(|node| self.resolve(node, payload))
    }

    fn resolve_array_path(
        &self,
        source: &Operand<FieldPath>,
        item: Option<&Node>,
        payload: &Value,
    ) -> Option<Value> {
        let root = match source {
            Operand::Static(path) => path.lookup(payload).cloned(),
            Operand::Dynamic(node) => self.resolve(node, payload),
        }?;

        let elements = match root {
            Value::Array(elements) => elements,
            single => vec![single],
        };

        let Some(item) = item else {
            return Some(Value::Array(elements));
        };

        Some(Value::Array(
            elements
                .iter()
                .filter_map(|element| self.resolve(item, element))
                .filter(|mapped| !matches!(mapped, Value::Object(obj) if obj.is_empty()))
                .collect(),
        ))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(true)
    }
}
