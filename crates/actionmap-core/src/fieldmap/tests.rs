//! Tests for field map evaluation
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::fieldmap::{evaluate, map_event, FieldMap, FieldSpec, Object};
    use crate::mapping::Mapping;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap_or_default()
    }

    fn eval(map: &FieldMap, payload: Value) -> Option<Value> {
        evaluate(map, &object(payload)).unwrap().map(Value::Object)
    }

    #[test]
    fn test_drop_suppresses_field() {
        let map = FieldMap::builder().drop_field("secret").build().unwrap();
        assert_eq!(eval(&map, json!({"secret": "x", "other": "y"})), None);

        let err = map_event(&map, &json!({"secret": "x", "other": "y"})).unwrap_err();
        assert!(matches!(err, Error::NoMappableFields { .. }));
        assert_eq!(err.to_string(), "Invalid request data: payload has no supported fields");
    }

    #[test]
    fn test_drop_is_never_captured() {
        let map = FieldMap::builder()
            .drop_field("secret")
            .field("other", FieldSpec::new())
            .unmapped_to_root()
            .build()
            .unwrap();
        assert_eq!(
            eval(&map, json!({"secret": "x", "other": "y", "extra": 1})),
            Some(json!({"other": "y", "extra": 1}))
        );
    }

    #[test]
    fn test_unmapped_capture_root_vs_named() {
        let payload = json!({"id": "a", "extra": "v", "count": 2, "nested": {"k": true}});

        let root = FieldMap::builder()
            .field("id", FieldSpec::new())
            .unmapped_to_root()
            .build()
            .unwrap();
        assert_eq!(
            eval(&root, payload.clone()),
            Some(json!({"id": "a", "extra": "v", "count": 2, "nested": {"k": true}}))
        );

        let named = FieldMap::builder()
            .field("id", FieldSpec::new())
            .unmapped_to("meta")
            .build()
            .unwrap();
        assert_eq!(
            eval(&named, payload),
            Some(json!({"id": "a", "meta": {"extra": "v", "count": "2", "nested": "{\"k\":true}"}}))
        );
    }

    #[test]
    fn test_unmapped_fields_without_target_are_ignored() {
        let map = FieldMap::builder().field("id", FieldSpec::new()).build().unwrap();
        assert_eq!(eval(&map, json!({"id": 1, "extra": 2})), Some(json!({"id": 1})));
    }

    #[test]
    fn test_copy_passes_value_through() {
        let map = FieldMap::builder().copy_field("props").build().unwrap();
        assert_eq!(
            eval(&map, json!({"props": {"a": [1]}})),
            Some(json!({"props": {"a": [1]}}))
        );
    }

    #[test]
    fn test_rename_and_path_names() {
        let map = FieldMap::builder()
            .field("email", FieldSpec::new().path(["user", "contact", "email"]))
            .field("name", FieldSpec::new().path(["user", "name"]))
            .field("plan", FieldSpec::new().name("tier"))
            .build()
            .unwrap();
        assert_eq!(
            eval(&map, json!({"email": "a@b.co", "name": "Ada", "plan": "pro"})),
            Some(json!({"user": {"contact": {"email": "a@b.co"}, "name": "Ada"}, "tier": "pro"}))
        );
    }

    #[test]
    fn test_null_and_falsy_values_are_written() {
        let map = FieldMap::builder()
            .copy_field("n")
            .copy_field("f")
            .copy_field("z")
            .copy_field("s")
            .field("o", FieldSpec::new())
            .field("a", FieldSpec::new())
            .build()
            .unwrap();
        let payload = json!({"n": null, "f": false, "z": 0, "s": "", "o": {}, "a": []});
        assert_eq!(eval(&map, payload.clone()), Some(payload));
    }

    #[test]
    fn test_function_convert() {
        let map = FieldMap::builder()
            .field(
                "price",
                FieldSpec::new().name("cents").convert_with(|v| {
                    Ok(v.as_f64().map(|p| json!((p * 100.0).round() as i64)))
                }),
            )
            .build()
            .unwrap();
        assert_eq!(eval(&map, json!({"price": 1.25})), Some(json!({"cents": 125})));
        assert_eq!(eval(&map, json!({"price": "free"})), None);
    }

    #[test]
    fn test_directive_convert_reads_current_level() {
        let convert = Mapping::compile(&json!({"@template": "{{first}} {{last}}"})).unwrap();
        let map = FieldMap::builder()
            .field("first", FieldSpec::new().name("full_name").convert_mapping(convert))
            .build()
            .unwrap();
        assert_eq!(
            eval(&map, json!({"first": "Ada", "last": "Lovelace"})),
            Some(json!({"full_name": "Ada Lovelace"}))
        );
    }

    #[test]
    fn test_convert_errors_propagate_unchanged() {
        let map = FieldMap::builder()
            .field(
                "a",
                FieldSpec::new().convert_with(|_| Err(anyhow::anyhow!("bad value for a"))),
            )
            .build()
            .unwrap();
        let err = map_event(&map, &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(err.to_string(), "bad value for a");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_nested_object_shape() {
        let address = FieldMap::builder()
            .field("zip", FieldSpec::new().name("postal_code"))
            .drop_field("internal")
            .build()
            .unwrap();
        let map = FieldMap::builder()
            .field("address", FieldSpec::object(address))
            .build()
            .unwrap();
        assert_eq!(
            eval(&map, json!({"address": {"zip": "10115", "internal": 1}})),
            Some(json!({"address": {"postal_code": "10115"}}))
        );
        assert_eq!(eval(&map, json!({"address": {"internal": 1}})), None);
    }

    #[test]
    fn test_array_filtering_preserves_order() {
        let item = FieldMap::builder().field("id", FieldSpec::new()).build().unwrap();
        let map = FieldMap::builder()
            .field("items", FieldSpec::array_of(item))
            .build()
            .unwrap();
        assert_eq!(
            eval(&map, json!({"items": [{"id": 1}, {}, {"id": 3}]})),
            Some(json!({"items": [{"id": 1}, {"id": 3}]}))
        );
        assert_eq!(
            eval(&map, json!({"items": {"id": 9}})),
            Some(json!({"items": [{"id": 9}]}))
        );
    }

    #[test]
    fn test_default_object_seeds_output() {
        let map = FieldMap::builder()
            .field("id", FieldSpec::new())
            .default_object(json!({"source": "web", "id": "none"}))
            .build()
            .unwrap();
        assert_eq!(eval(&map, json!({"id": "u1"})), Some(json!({"source": "web", "id": "u1"})));
        assert_eq!(eval(&map, json!({})), Some(json!({"source": "web", "id": "none"})));
    }

    #[test]
    fn test_finalize_adds_flag_to_non_empty_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let map = FieldMap::builder()
            .field("id", FieldSpec::new())
            .finalize(move |mut output| {
                counter.fetch_add(1, Ordering::SeqCst);
                output.insert("flag".to_string(), json!(true));
                Ok(output)
            })
            .build()
            .unwrap();

        assert_eq!(eval(&map, json!({"id": 1})), Some(json!({"id": 1, "flag": true})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(eval(&map, json!({"other": 1})), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_finalize_that_empties_output_yields_nothing() {
        let map = FieldMap::builder()
            .copy_field("id")
            .finalize(|_| Ok(Object::new()))
            .build()
            .unwrap();
        assert_eq!(eval(&map, json!({"id": 1})), None);
    }

    #[test]
    fn test_finalize_errors_propagate() {
        let map = FieldMap::builder()
            .copy_field("id")
            .finalize(|_| anyhow::bail!("finalize failed"))
            .build()
            .unwrap();
        let err = evaluate(&map, &object(json!({"id": 1}))).unwrap_err();
        assert_eq!(err.to_string(), "finalize failed");
    }

    #[test]
    fn test_map_event_requires_object_payload() {
        let map = FieldMap::builder().copy_field("id").build().unwrap();
        let err = map_event(&map, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let map = FieldMap::from_value(
            &json!({
                "fields": {
                    "email": {"name": ["traits", "email"], "convert": {"@case": {"operator": "lower", "value": {"@path": "$.email"}}}},
                    "items": {"type": "array", "fields": {"sku": {"name": "product_id"}}},
                    "password": "DROP"
                },
                "unmappedFieldObject": "properties"
            }),
            &EngineConfig::default(),
        )
        .unwrap();
        let payload = json!({
            "email": "ADA@B.CO",
            "items": [{"sku": "s1"}, {"price": 2}],
            "password": "x",
            "plan": "pro"
        });

        let first = map_event(&map, &payload).unwrap();
        let second = map_event(&map, &payload).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            Value::Object(first),
            json!({
                "traits": {"email": "ada@b.co"},
                "items": [{"product_id": "s1"}],
                "properties": {"plan": "pro"}
            })
        );
    }

    #[test]
    fn test_referenced_keys() {
        let convert = Mapping::compile(&json!({"@path": "$.raw_email"})).unwrap();
        let item = FieldMap::builder().copy_field("sku").drop_field("cost").build().unwrap();
        let map = FieldMap::builder()
            .field("email", FieldSpec::new().convert_mapping(convert))
            .field("items", FieldSpec::array_of(item))
            .drop_field("password")
            .build()
            .unwrap();
        assert_eq!(map.referenced_keys(), vec!["$.raw_email", "email", "items", "items.sku"]);
    }
}
