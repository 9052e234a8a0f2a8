//! Loading field maps from JSON
//!
//! File format:
//!
//! ```json
//! {
//!   "fields": {
//!     "password": "DROP",
//!     "id": "COPY",
//!     "email": { "name": ["user", "email"], "convert": { "@case": { "operator": "lower", "value": { "@path": "$.email" } } } },
//!     "items": { "type": "array", "fields": { "sku": { "name": "product_id" } } },
//!     "plan": { "@path": "$.traits.plan" }
//!   },
//!   "unmappedFieldObject": "ROOT",
//!   "defaultObject": { "source": "web" }
//! }
//! ```
//!
//! An entry that is itself a directive is shorthand for a field whose
//! `convert` is that directive. Function converts and finalizers have no file
//! form; use the builder.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::builder::FieldMapBuilder;
use super::types::{FieldMap, FieldShape, FieldSpec, OutputName};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::mapping::{is_directive, Mapping};
use serde::Deserialize;
use serde_json::{Map, Value};

const DROP_MARKER: &str = "DROP";
const COPY_MARKER: &str = "COPY";
const ROOT_MARKER: &str = "ROOT";

const FIELD_SPEC_KEYS: [&str; 6] = [
    "name",
    "convert",
    "type",
    "fields",
    "unmappedFieldObject",
    "defaultObject",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldMap {
    #[serde(default)]
    fields: Map<String, Value>,
    unmapped_field_object: Option<String>,
    default_object: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldSpec {
    name: Option<RawName>,
    convert: Option<Value>,
    #[serde(rename = "type")]
    shape: Option<RawShape>,
    #[serde(flatten)]
    nested: RawFieldMap,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawName {
    Key(String),
    Path(Vec<String>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawShape {
    Object,
    Array,
}

impl FieldMap {
    /// Load a field map from its JSON form
    ///
    /// Directive converts are compiled with `config`.
    pub fn from_value(value: &Value, config: &EngineConfig) -> Result<Self> {
        let raw = RawFieldMap::deserialize(value)?;
        build_map(raw, config, "")
    }

    pub fn from_json_str(text: &str, config: &EngineConfig) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value, config)
    }
}

fn build_map(raw: RawFieldMap, config: &EngineConfig, location: &str) -> Result<FieldMap> {
    let mut builder = FieldMapBuilder::new();

    for (key, entry) in raw.fields {
        let here = format!("{location}/{key}");
        let directive = is_directive(&entry);
        builder = match entry {
            Value::String(marker) if marker == DROP_MARKER => builder.drop_field(key),
            Value::String(marker) if marker == COPY_MARKER => builder.copy_field(key),
            Value::String(other) => {
                return Err(Error::configuration(format!(
                    "{here}: unknown field marker \"{other}\", expected \"{DROP_MARKER}\" or \"{COPY_MARKER}\""
                )))
            }
            Value::Object(_) if directive => {
                let mapping = Mapping::compile_with(&entry, config)
                    .map_err(|e| Error::configuration(format!("{here}: {e}")))?;
                builder.field(key, FieldSpec::new().convert_mapping(mapping))
            }
            Value::Object(ref spec) => {
                if let Some(unknown) = spec.keys().find(|k| !FIELD_SPEC_KEYS.contains(&k.as_str())) {
                    return Err(Error::configuration(format!(
                        "{here}: unknown key \"{unknown}\", expected one of {}",
                        FIELD_SPEC_KEYS.join(", ")
                    )));
                }
                let spec = RawFieldSpec::deserialize(&entry)
                    .map_err(|e| Error::configuration(format!("{here}: {e}")))?;
                builder.field(key, build_spec(spec, config, &here)?)
            }
            other => {
                return Err(Error::configuration(format!(
                    "{here}: expected a field marker or an object but found {}",
                    crate::mapping::type_name(&other)
                )))
            }
        };
    }

    builder = match raw.unmapped_field_object.as_deref() {
        None => builder,
        Some(ROOT_MARKER) => builder.unmapped_to_root(),
        Some(name) => builder.unmapped_to(name),
    };

    if let Some(seed) = raw.default_object {
        builder = builder.default_object(seed);
    }

    builder
        .build()
        .map_err(|e| prefix_error(e, location))
}

fn build_spec(raw: RawFieldSpec, config: &EngineConfig, location: &str) -> Result<FieldSpec> {
    let name = raw.name.map(|name| match name {
        RawName::Key(key) => OutputName::Key(key),
        RawName::Path(path) => OutputName::Path(path),
    });

    let convert = match raw.convert {
        Some(directive) => Some(
            Mapping::compile_with(&directive, config)
                .map_err(|e| Error::configuration(format!("{location}/convert: {e}")))?,
        ),
        None => None,
    };

    let has_nested = !raw.nested.fields.is_empty()
        || raw.nested.unmapped_field_object.is_some()
        || raw.nested.default_object.is_some();

    let shape = match raw.shape {
        Some(RawShape::Object) => {
            FieldShape::Object(Box::new(build_map(raw.nested, config, location)?))
        }
        Some(RawShape::Array) if has_nested => {
            FieldShape::Array(Some(Box::new(build_map(raw.nested, config, location)?)))
        }
        Some(RawShape::Array) => FieldShape::Array(None),
        None if has_nested => {
            return Err(Error::configuration(format!(
                "{location}: nested fields need \"type\": \"object\" or \"array\""
            )))
        }
        None => FieldShape::Value,
    };

    let mut spec = FieldSpec::new();
    spec.name = name;
    spec.shape = shape;
    if let Some(mapping) = convert {
        spec = spec.convert_mapping(mapping);
    }
    Ok(spec)
}

fn prefix_error(error: Error, location: &str) -> Error {
    match error {
        Error::Configuration { message } if !location.is_empty() => {
            Error::configuration(format!("{location}: {message}"))
        }
        other => other,
    }
}
