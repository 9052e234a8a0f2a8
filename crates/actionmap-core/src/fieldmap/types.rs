//! Field map types
//!
//! A field map is keyed by input field name. Each entry either suppresses
//! the field (`Drop`), passes it through (`Copy`) or describes how to rename,
//! convert and reshape it (`Field`).
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use crate::mapping::Mapping;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// JSON object used for payloads and outputs
pub type Object = Map<String, Value>;

/// Conversion callback; `Ok(None)` leaves the field out
pub type ConvertFn = dyn Fn(&Value) -> anyhow::Result<Option<Value>> + Send + Sync;

/// Post-processing callback applied to a non-empty output
pub type FinalizeFn = dyn Fn(Object) -> anyhow::Result<Object> + Send + Sync;

/// How a field value is converted before it is shaped
#[derive(Clone)]
pub enum Convert {
    /// Rust callback receiving the raw field value
    Function(Arc<ConvertFn>),
    /// Mapping resolved against the input object of the current level
    Directive(Mapping),
}

impl Convert {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        Convert::Function(Arc::new(f))
    }
}

impl fmt::Debug for Convert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convert::Function(_) => f.write_str("Convert::Function(..)"),
            Convert::Directive(mapping) => f.debug_tuple("Convert::Directive").field(mapping).finish(),
        }
    }
}

/// Output location of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputName {
    Key(String),
    /// Nested placement; missing intermediate objects are created
    Path(Vec<String>),
}

impl From<&str> for OutputName {
    fn from(key: &str) -> Self {
        OutputName::Key(key.to_string())
    }
}

impl From<String> for OutputName {
    fn from(key: String) -> Self {
        OutputName::Key(key)
    }
}

impl From<Vec<String>> for OutputName {
    fn from(path: Vec<String>) -> Self {
        OutputName::Path(path)
    }
}

impl fmt::Display for OutputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputName::Key(key) => f.write_str(key),
            OutputName::Path(path) => f.write_str(&path.join(".")),
        }
    }
}

/// Shape applied to the converted value
#[derive(Debug, Clone, Default)]
pub enum FieldShape {
    /// Used as-is
    #[default]
    Value,
    /// Evaluated recursively with a nested field map
    Object(Box<FieldMap>),
    /// Each element evaluated with the nested map, if one is given
    Array(Option<Box<FieldMap>>),
}

/// Mapping instructions for one input field
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub name: Option<OutputName>,
    pub convert: Option<Convert>,
    pub shape: FieldShape,
}

impl FieldSpec {
    /// Field copied under its own name, unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Field evaluated with a nested map
    pub fn object(fields: FieldMap) -> Self {
        Self {
            shape: FieldShape::Object(Box::new(fields)),
            ..Self::default()
        }
    }

    /// Array field whose elements are evaluated with a nested map
    pub fn array_of(fields: FieldMap) -> Self {
        Self {
            shape: FieldShape::Array(Some(Box::new(fields))),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<OutputName>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name = Some(OutputName::Path(segments.into_iter().map(Into::into).collect()));
        self
    }

    pub fn convert_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.convert = Some(Convert::function(f));
        self
    }

    pub fn convert_mapping(mut self, mapping: Mapping) -> Self {
        self.convert = Some(Convert::Directive(mapping));
        self
    }
}

/// Entry of a field table
#[derive(Debug, Clone)]
pub enum FieldEntry {
    /// Never include this input field, not even as an unmapped field
    Drop,
    /// Pass the raw value through under the same key
    Copy,
    Field(FieldSpec),
}

/// Destination of fields without an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmappedTarget {
    /// Top level of the output, value unchanged
    Root,
    /// Named sub-object, values stringified
    Object(String),
}

/// Post-processing step run on a non-empty output
#[derive(Clone)]
pub struct Finalizer(pub(crate) Arc<FinalizeFn>);

impl Finalizer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Object) -> anyhow::Result<Object> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, output: Object) -> anyhow::Result<Object> {
        (self.0)(output)
    }
}

impl fmt::Debug for Finalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Finalizer(..)")
    }
}

/// A complete field map for one object level
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    pub(crate) fields: HashMap<String, FieldEntry>,
    pub(crate) unmapped: Option<UnmappedTarget>,
    pub(crate) default_object: Option<Object>,
    pub(crate) finalize: Option<Finalizer>,
}

impl FieldMap {
    pub fn entry(&self, key: &str) -> Option<&FieldEntry> {
        self.fields.get(key)
    }

    pub fn unmapped_target(&self) -> Option<&UnmappedTarget> {
        self.unmapped.as_ref()
    }

    pub fn default_object(&self) -> Option<&Object> {
        self.default_object.as_ref()
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalize.is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Input keys this map reads, sorted
    ///
    /// Nested maps contribute `parent.child` keys; directive converts
    /// contribute the keys of their mapping.
    pub fn referenced_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        self.collect_keys("", &mut keys);
        keys.retain(|key| !key.is_empty());
        keys.sort();
        keys.dedup();
        keys
    }

    fn collect_keys(&self, prefix: &str, keys: &mut Vec<String>) {
        for (key, entry) in &self.fields {
            let qualified = format!("{prefix}{key}");
            match entry {
                FieldEntry::Drop => {}
                FieldEntry::Copy => keys.push(qualified),
                FieldEntry::Field(spec) => {
                    if let Some(Convert::Directive(mapping)) = &spec.convert {
                        keys.extend(mapping.keys());
                    }
                    match &spec.shape {
                        FieldShape::Object(nested) | FieldShape::Array(Some(nested)) => {
                            nested.collect_keys(&format!("{qualified}."), keys);
                        }
                        FieldShape::Value | FieldShape::Array(None) => {}
                    }
                    keys.push(qualified);
                }
            }
        }
    }
}
