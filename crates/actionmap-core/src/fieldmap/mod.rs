//! Field maps
//!
//! A field map describes an output object in terms of the payload's own
//! keys: which fields to rename, convert, nest, drop or pass through, where
//! unmapped fields go, and how to post-process the result.
//!
//! - [`types`] - Field map, entries and callbacks
//! - [`builder`] - Fluent builder
//! - [`loader`] - JSON file form
//! - [`evaluator`] - `evaluate` and `map_event`
//! - [`prestep`] - Payload reshaping applied before evaluation
//!
//! # Examples
//!
//! ```
//! use actionmap_core::fieldmap::{map_event, FieldMap, FieldSpec};
//! use serde_json::json;
//!
//! let map = FieldMap::builder()
//!     .field("userId", FieldSpec::new().name("user_id"))
//!     .drop_field("password")
//!     .unmapped_to("meta")
//!     .build()
//!     .unwrap();
//!
//! let output = map_event(&map, &json!({"userId": "u1", "password": "x", "plan": 3})).unwrap();
//! assert_eq!(serde_json::Value::Object(output), json!({"user_id": "u1", "meta": {"plan": "3"}}));
//! ```
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod evaluator;
pub mod loader;
pub mod prestep;
pub mod types;

#[cfg(test)]
mod tests;

pub use builder::FieldMapBuilder;
pub use evaluator::{evaluate, map_event};
pub use prestep::spread_nested_object;
pub use types::{
    Convert, FieldEntry, FieldMap, FieldShape, FieldSpec, Finalizer, Object, OutputName,
    UnmappedTarget,
};
