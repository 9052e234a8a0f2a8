//! Field map evaluation
//!
//! Walks the payload's own keys in insertion order and looks each one up in
//! the field table of the current level. Only absent results are left out of
//! the output; `null`, `false`, `0`, `""`, `{}` and `[]` are written.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::types::{Convert, FieldEntry, FieldMap, FieldShape, FieldSpec, Object, OutputName, UnmappedTarget};
use crate::error::{Error, Result};
use serde_json::Value;
use std::cell::OnceCell;

/// Evaluate `map` against one object level
///
/// Returns `Ok(None)` when nothing was written. The finalizer only runs on a
/// non-empty output; if it empties the output the result is `None` as well.
/// Errors come only from user callbacks.
pub fn evaluate(map: &FieldMap, input: &Object) -> Result<Option<Object>> {
    let mut output = map.default_object.clone().unwrap_or_default();
    let level = Level::new(input);

    for (key, value) in input {
        match map.fields.get(key) {
            None => capture_unmapped(map.unmapped.as_ref(), &mut output, key, value),
            Some(FieldEntry::Drop) => {}
            Some(FieldEntry::Copy) => {
                output.insert(key.clone(), value.clone());
            }
            Some(FieldEntry::Field(spec)) => {
                if let Some(mapped) = map_field(spec, value, &level)? {
                    match &spec.name {
                        Some(name) => write_output(&mut output, name, mapped),
                        None => {
                            output.insert(key.clone(), mapped);
                        }
                    }
                }
            }
        }
    }

    if output.is_empty() {
        return Ok(None);
    }

    if let Some(finalize) = &map.finalize {
        output = finalize.apply(output).map_err(Error::Callback)?;
        if output.is_empty() {
            return Ok(None);
        }
    }

    Ok(Some(output))
}

/// Evaluate a field map against an event payload, requiring output
pub fn map_event(map: &FieldMap, payload: &Value) -> Result<Object> {
    let input = payload
        .as_object()
        .ok_or_else(|| Error::invalid_payload(payload))?;
    evaluate(map, input)?.ok_or_else(Error::no_mappable_fields)
}

/// One object level, converted to a `Value` at most once for directive converts
struct Level<'a> {
    input: &'a Object,
    value: OnceCell<Value>,
}

impl<'a> Level<'a> {
    fn new(input: &'a Object) -> Self {
        Self {
            input,
            value: OnceCell::new(),
        }
    }

    fn as_value(&self) -> &Value {
        self.value.get_or_init(|| Value::Object(self.input.clone()))
    }
}

fn map_field(spec: &FieldSpec, value: &Value, level: &Level<'_>) -> Result<Option<Value>> {
    let converted = match &spec.convert {
        None => Some(value.clone()),
        Some(Convert::Function(convert)) => convert(value).map_err(Error::Callback)?,
        Some(Convert::Directive(mapping)) => mapping.resolve(level.as_value()),
    };
    let Some(converted) = converted else {
        return Ok(None);
    };

    match &spec.shape {
        FieldShape::Value | FieldShape::Array(None) => Ok(Some(converted)),
        FieldShape::Object(nested) => match converted {
            Value::Object(obj) => Ok(evaluate(nested, &obj)?.map(Value::Object)),
            _ => Ok(None),
        },
        FieldShape::Array(Some(nested)) => {
            let elements = match converted {
                Value::Array(elements) => elements,
                single => vec![single],
            };
            let mut mapped = Vec::with_capacity(elements.len());
            for element in &elements {
                if let Value::Object(obj) = element {
                    if let Some(result) = evaluate(nested, obj)? {
                        mapped.push(Value::Object(result));
                    }
                }
            }
            Ok(Some(Value::Array(mapped)))
        }
    }
}

fn capture_unmapped(target: Option<&UnmappedTarget>, output: &mut Object, key: &str, value: &Value) {
    match target {
        None => {}
        Some(UnmappedTarget::Root) => {
            output.insert(key.to_string(), value.clone());
        }
        Some(UnmappedTarget::Object(name)) => {
            let bucket = output
                .entry(name.clone())
                .or_insert_with(|| Value::Object(Object::new()));
            if !bucket.is_object() {
                *bucket = Value::Object(Object::new());
            }
            if let Value::Object(bucket) = bucket {
                bucket.insert(key.to_string(), Value::String(stringify(value)));
            }
        }
    }
}

/// Text form used for unmapped capture into a named object
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_output(output: &mut Object, name: &OutputName, value: Value) {
    match name {
        OutputName::Key(key) => {
            output.insert(key.clone(), value);
        }
        OutputName::Path(path) => {
            let Some((last, parents)) = path.split_last() else {
                return;
            };
            let mut current = output;
            for segment in parents {
                let slot = current
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Object::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Object::new());
                }
                current = match slot {
                    Value::Object(obj) => obj,
                    _ => return,
                };
            }
            current.insert(last.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldmap::FieldSpec;
    use serde_json::json;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(obj) => obj,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_nested_path_write() {
        let mut output = object(json!({"a": {"keep": 1}, "b": 5}));
        write_output(&mut output, &OutputName::Path(vec!["a".into(), "x".into()]), json!(1));
        write_output(&mut output, &OutputName::Path(vec!["b".into(), "y".into()]), json!(2));
        assert_eq!(Value::Object(output), json!({"a": {"keep": 1, "x": 1}, "b": {"y": 2}}));
    }

    #[test]
    fn test_named_capture_replaces_non_object() {
        let mut output = object(json!({"meta": "oops"}));
        capture_unmapped(Some(&UnmappedTarget::Object("meta".into())), &mut output, "n", &json!(3));
        assert_eq!(Value::Object(output), json!({"meta": {"n": "3"}}));
    }

    #[test]
    fn test_array_elements_that_are_not_objects_are_dropped() {
        let inner = FieldMap::builder().copy_field("id").build().unwrap();
        let map = FieldMap::builder()
            .field("items", FieldSpec::array_of(inner))
            .build()
            .unwrap();
        let output = evaluate(&map, &object(json!({"items": [{"id": 1}, 2, "x", {"id": 3}]}))).unwrap();
        assert_eq!(output.map(Value::Object), Some(json!({"items": [{"id": 1}, {"id": 3}]})));
    }

    #[test]
    fn test_object_shape_on_scalar_is_absent() {
        let inner = FieldMap::builder().copy_field("id").build().unwrap();
        let map = FieldMap::builder()
            .field("user", FieldSpec::object(inner))
            .copy_field("other")
            .build()
            .unwrap();
        let output = evaluate(&map, &object(json!({"user": "u1", "other": 1}))).unwrap();
        assert_eq!(output.map(Value::Object), Some(json!({"other": 1})));
    }

    #[test]
    fn test_directive_converts_share_one_level_value() {
        let email = crate::mapping::Mapping::compile(&json!({"@path": "$.traits.email"})).unwrap();
        let plan = crate::mapping::Mapping::compile(&json!({"@path": "$.traits.plan"})).unwrap();
        let map = FieldMap::builder()
            .field("email", FieldSpec::new().convert_mapping(email))
            .field("plan", FieldSpec::new().convert_mapping(plan))
            .copy_field("traits")
            .build()
            .unwrap();
        let input = object(json!({"email": "x", "plan": "y", "traits": {"email": "a@b.co", "plan": "pro"}}));

        let level = Level::new(&input);
        assert!(level.value.get().is_none());
        assert!(std::ptr::eq(level.as_value(), level.as_value()));

        let output = evaluate(&map, &input).unwrap();
        assert_eq!(
            output.map(Value::Object),
            Some(json!({"email": "a@b.co", "plan": "pro", "traits": {"email": "a@b.co", "plan": "pro"}}))
        );
    }
}
