//! Directive-based mapping engine
//!
//! A mapping is a JSON tree describing an output shape. Plain values and
//! objects are copied structurally; objects holding one of the reserved
//! `@`-keys are directives that derive a value from the payload.
//!
//! # Module Organization
//!
//! - [`path`] - Dot/bracket field paths
//! - [`template`] - `{{placeholder}}` templates
//! - [`directive`] - Compiled node and directive types
//! - [`functions`] - Value functions behind `@case`, `@replace` and `@json`
//! - [`compiler`] - Validation and compilation of raw mappings
//! - [`resolver`] - Evaluation of compiled mappings
//! - [`keys`] - Static key extraction
//!
//! # Examples
//!
//! ```
//! use actionmap_core::mapping::Mapping;
//! use serde_json::json;
//!
//! let mapping = Mapping::compile(&json!({
//!     "email": {"@path": "$.traits.email"},
//!     "greeting": {"@template": "Hi {{traits.name}}"}
//! })).unwrap();
//!
//! let payload = json!({"traits": {"email": "a@b.co", "name": "Ada"}});
//! let output = mapping.transform(&payload).unwrap();
//! assert_eq!(output, Some(json!({"email": "a@b.co", "greeting": "Hi Ada"})));
//! assert_eq!(mapping.keys(), vec!["$.traits.email", "traits.name"]);
//! ```
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

pub mod compiler;
pub mod directive;
pub mod functions;
pub mod keys;
pub mod path;
pub mod resolver;
pub mod template;


pub use compiler::{Compiled, Compiler};
pub use directive::{
    is_directive, type_name, CaseOperator, Conditional, Directive, DirectiveKind, JsonMode, Node,
    Operand, Predicate, Replacement,
};
pub use path::{FieldPath, PathSegment};
pub use resolver::Resolver;
pub use template::Template;

use crate::config::EngineConfig;
use crate::error::{Error, Result, ValidationErrors};
use serde_json::{Map, Value};

/// A compiled, immutable mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    root: Node,
    escape_templates: bool,
    diagnostics: ValidationErrors,
}

impl Mapping {
    /// Compile with the default (strict) configuration
    pub fn compile(mapping: &Value) -> Result<Self> {
        Self::compile_with(mapping, &EngineConfig::default())
    }

    pub fn compile_with(mapping: &Value, config: &EngineConfig) -> Result<Self> {
        let Compiled { root, diagnostics } = Compiler::new(config).compile(mapping)?;
        Ok(Self {
            root,
            escape_templates: config.escape_templates,
            diagnostics,
        })
    }

    /// Wrap an already compiled node
    pub fn from_node(root: Node, escape_templates: bool) -> Self {
        Self {
            root,
            escape_templates,
            diagnostics: ValidationErrors::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Problems a lenient compile worked around
    pub fn diagnostics(&self) -> &ValidationErrors {
        &self.diagnostics
    }

    /// Resolve against any JSON value; `None` means absent
    pub fn resolve(&self, data: &Value) -> Option<Value> {
        Resolver::new(self.escape_templates).resolve(&self.root, data)
    }

    /// Apply the mapping to an event payload
    ///
    /// The payload must be a JSON object.
    pub fn transform(&self, payload: &Value) -> Result<Option<Value>> {
        if !payload.is_object() {
            return Err(Error::invalid_payload(payload));
        }
        Ok(self.resolve(payload))
    }

    /// Apply the mapping and require a non-empty object result
    pub fn transform_object(&self, payload: &Value) -> Result<Map<String, Value>> {
        match self.transform(payload)? {
            Some(Value::Object(output)) if !output.is_empty() => Ok(output),
            _ => Err(Error::no_mappable_fields()),
        }
    }

    /// Payload keys this mapping reads
    pub fn keys(&self) -> Vec<String> {
        keys::collect_keys(&self.root)
    }
}

/// Compile `mapping` strictly and apply it to `payload`
pub fn transform(mapping: &Value, payload: &Value) -> Result<Option<Value>> {
    Mapping::compile(mapping)?.transform(payload)
}

/// Like [`transform`], failing with `NoMappableFields` on an empty result
pub fn transform_object(mapping: &Value, payload: &Value) -> Result<Map<String, Value>> {
    Mapping::compile(mapping)?.transform_object(payload)
}

/// Keys referenced by a raw mapping value
///
/// The value is walked by shape without compiling it, so malformed
/// directives still contribute the keys they name and nothing is logged.
pub fn get_field_value_keys(value: &Value) -> Vec<String> {
    keys::raw_keys(value)
}
