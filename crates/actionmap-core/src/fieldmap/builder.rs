//! Builder for field maps
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::types::{FieldEntry, FieldMap, FieldSpec, Finalizer, Object, OutputName, UnmappedTarget};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Fluent builder for [`FieldMap`]
#[derive(Debug, Default)]
pub struct FieldMapBuilder {
    fields: HashMap<String, FieldEntry>,
    unmapped: Option<UnmappedTarget>,
    default_object: Option<Value>,
    finalize: Option<Finalizer>,
}

impl FieldMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an input field
    pub fn field(mut self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(key.into(), FieldEntry::Field(spec));
        self
    }

    /// Suppress an input field everywhere
    pub fn drop_field(mut self, key: impl Into<String>) -> Self {
        self.fields.insert(key.into(), FieldEntry::Drop);
        self
    }

    /// Pass an input field through unchanged
    pub fn copy_field(mut self, key: impl Into<String>) -> Self {
        self.fields.insert(key.into(), FieldEntry::Copy);
        self
    }

    /// Collect unmapped fields at the top level of the output
    pub fn unmapped_to_root(mut self) -> Self {
        self.unmapped = Some(UnmappedTarget::Root);
        self
    }

    /// Collect unmapped fields, stringified, in a named sub-object
    pub fn unmapped_to(mut self, name: impl Into<String>) -> Self {
        self.unmapped = Some(UnmappedTarget::Object(name.into()));
        self
    }

    /// Object every output starts from
    pub fn default_object(mut self, seed: Value) -> Self {
        self.default_object = Some(seed);
        self
    }

    pub fn finalize<F>(mut self, f: F) -> Self
    where
        F: Fn(Object) -> anyhow::Result<Object> + Send + Sync + 'static,
    {
        self.finalize = Some(Finalizer::new(f));
        self
    }

    /// Build the field map
    pub fn build(self) -> Result<FieldMap> {
        let default_object = match self.default_object {
            None => None,
            Some(Value::Object(seed)) => Some(seed),
            Some(other) => {
                return Err(Error::configuration(format!(
                    "default object must be a JSON object, got {}",
                    crate::mapping::type_name(&other)
                )))
            }
        };

        if let Some(UnmappedTarget::Object(name)) = &self.unmapped {
            if name.is_empty() {
                return Err(Error::configuration("unmapped field object name is empty"));
            }
        }

        for (key, entry) in &self.fields {
            if let FieldEntry::Field(FieldSpec {
                name: Some(OutputName::Path(path)),
                ..
            }) = entry
            {
                if path.is_empty() {
                    return Err(Error::configuration(format!(
                        "field \"{}\" has an empty output path",
                        key
                    )));
                }
            }
        }

        Ok(FieldMap {
            fields: self.fields,
            unmapped: self.unmapped,
            default_object,
            finalize: self.finalize,
        })
    }
}

impl FieldMap {
    pub fn builder() -> FieldMapBuilder {
        FieldMapBuilder::new()
    }
}
