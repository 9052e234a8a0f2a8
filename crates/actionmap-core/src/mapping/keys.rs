//! Static key extraction
//!
//! Lists every payload key a mapping may read without evaluating it. Keys
//! inside an `@arrayPath` item mapping are relative to the array elements.
//!
//! [`collect_keys`] walks a compiled tree. [`raw_keys`] walks authored JSON
//! by shape alone, so malformed directives still report what they name.

use super::directive::{Conditional, Directive, DirectiveKind, Node, Operand, Predicate};
use super::template::Template;
use serde_json::Value;

const IF_OPERANDS: [&str; 4] = ["blank", "exists", "then", "else"];

/// Referenced keys in mapping order; empty keys are left out
pub fn collect_keys(node: &Node) -> Vec<String> {
    let mut keys = Vec::new();
    visit(node, &mut keys);
    keys.retain(|key| !key.is_empty());
    keys
}

fn visit(node: &Node, keys: &mut Vec<String>) {
    match node {
        Node::Value(_) | Node::Array(_) => {}
        Node::Object(entries) => {
            for (_, child) in entries {
                visit(child, keys);
            }
        }
        Node::Directive(directive) => visit_directive(directive, keys),
    }
}

fn visit_directive(directive: &Directive, keys: &mut Vec<String>) {
    match directive {
        Directive::Literal(_) => {}
        Directive::Path(Operand::Static(path)) => keys.push(path.as_str().to_string()),
        Directive::Template(Operand::Static(template)) => {
            keys.extend(template.keys().map(str::to_string));
        }
        Directive::Path(Operand::Dynamic(node)) | Directive::Template(Operand::Dynamic(node)) => {
            visit(node, keys)
        }
        Directive::If(Conditional {
            predicate,
            then,
            otherwise,
        }) => {
            match predicate {
                Predicate::Exists(node) | Predicate::Blank(node) => visit(node, keys),
            }
            for branch in [then, otherwise].into_iter().flatten() {
                visit(branch, keys);
            }
        }
        Directive::ArrayPath { source, item } => {
            match source {
                Operand::Static(path) => keys.push(path.as_str().to_string()),
                Operand::Dynamic(node) => visit(node, keys),
            }
            if let Some(item) = item {
                visit(item, keys);
            }
        }
        Directive::Case { value, .. } | Directive::Json { value, .. } => visit(value, keys),
        Directive::Replace(replacement) => visit(&replacement.value, keys),
    }
}

/// Referenced keys of authored mapping JSON; nothing is validated
pub fn raw_keys(value: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    visit_raw(value, &mut keys);
    keys.retain(|key| !key.is_empty());
    keys
}

fn visit_raw(value: &Value, keys: &mut Vec<String>) {
    let Value::Object(obj) = value else {
        return;
    };
    let Some(kind) = DirectiveKind::detect(obj) else {
        for child in obj.values() {
            visit_raw(child, keys);
        }
        return;
    };

    let body = &obj[kind.key()];
    match kind {
        DirectiveKind::Literal => {}
        DirectiveKind::Path => match body {
            Value::String(path) => keys.push(path.clone()),
            other => visit_raw(other, keys),
        },
        DirectiveKind::Template => match body {
            Value::String(source) => {
                keys.extend(Template::parse(source).keys().map(str::to_string))
            }
            other => visit_raw(other, keys),
        },
        DirectiveKind::If => {
            if let Value::Object(conditional) = body {
                // authored order, so both predicates are reported when present
                for (key, operand) in conditional {
                    if IF_OPERANDS.contains(&key.as_str()) {
                        visit_raw(operand, keys);
                    }
                }
            }
        }
        DirectiveKind::ArrayPath => {
            if let Value::Array(items) = body {
                if let Some(source) = items.first() {
                    match source {
                        Value::String(path) => keys.push(path.clone()),
                        other => visit_raw(other, keys),
                    }
                }
                if let Some(item) = items.get(1) {
                    visit_raw(item, keys);
                }
            }
        }
        DirectiveKind::Case | DirectiveKind::Replace | DirectiveKind::Json => {
            if let Some(inner) = body.get("value") {
                visit_raw(inner, keys);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::mapping::compiler::Compiler;
    use serde_json::{json, Value};

    fn keys(mapping: Value) -> Vec<String> {
        let compiled = Compiler::new(&EngineConfig::default()).compile(&mapping).unwrap();
        collect_keys(&compiled.root)
    }

    #[test]
    fn test_if_union() {
        assert_eq!(
            keys(json!({"@if": {
                "blank": {"@path": "$.a"},
                "then": {"@path": "$.b"},
                "else": {"@template": "{{c}}"}
            }})),
            vec!["$.a", "$.b", "c"]
        );
    }

    #[test]
    fn test_literal_and_primitives_contribute_nothing() {
        assert!(keys(json!({"@literal": {"@path": "$.hidden"}})).is_empty());
        assert!(keys(json!({"a": 1, "b": "x", "c": [{"@path": "$.in_array"}]})).is_empty());
    }

    #[test]
    fn test_empty_paths_filtered() {
        assert_eq!(keys(json!({"a": {"@path": ""}, "b": {"@path": "$.b"}})), vec!["$.b"]);
    }

    #[test]
    fn test_raw_keys_match_compiled_keys() {
        let mapping = json!({
            "a": {"@path": "$.a"},
            "b": {"@arrayPath": ["$.items", {"id": {"@template": "{{sku}}"}}]},
            "c": {"@case": {"operator": "upper", "value": {"@path": "$.c"}}},
            "d": {"@literal": {"@path": "$.hidden"}}
        });
        assert_eq!(raw_keys(&mapping), keys(mapping));
    }

    #[test]
    fn test_raw_keys_report_both_if_predicates() {
        let mapping = json!({"@if": {
            "exists": {"@path": "$.a"},
            "blank": {"@path": "$.b"},
            "then": {"@path": "$.c"},
            "else": {"@path": "$.d"}
        }});
        assert_eq!(raw_keys(&mapping), vec!["$.a", "$.b", "$.c", "$.d"]);
    }

    #[test]
    fn test_raw_keys_ignore_validity() {
        assert_eq!(raw_keys(&json!({"x": {"@if": {"then": {"@path": "$.t"}}}})), vec!["$.t"]);
        assert_eq!(
            raw_keys(&json!({"@replace": {"value": {"@path": "$.r"}}})),
            vec!["$.r"]
        );
        assert!(raw_keys(&json!({"@path": 5})).is_empty());
    }

    #[test]
    fn test_nested_path_directive() {
        assert_eq!(keys(json!({"@path": {"@path": "$.which"}})), vec!["$.which"]);
    }
}
