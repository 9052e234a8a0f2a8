//! Actionmap Core - Mapping engine for analytics destination actions
//!
//! This crate projects analytics event payloads into the JSON shapes that
//! destination APIs expect.
//!
//! # Main Components
//!
//! - **Mappings**: directive-based JSON-to-JSON transforms (`@path`,
//!   `@template`, `@literal`, `@if`, `@arrayPath`, `@case`, `@replace`,
//!   `@json`) compiled once and evaluated per event
//! - **Field Maps**: key-by-key projection with renames, converts, nested
//!   objects and arrays, unmapped-field capture and finalizers
//! - **Key Extraction**: static listing of the payload keys a mapping reads
//! - **Error Handling**: error types built with `thiserror`
//!
//! # Example
//!
//! ```
//! use actionmap_core::{transform, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let mapping = json!({
//!         "user_id": {"@path": "$.userId"},
//!         "plan": {"@if": {"exists": {"@path": "$.traits.plan"}, "then": {"@path": "$.traits.plan"}, "else": "free"}}
//!     });
//!     let output = transform(&mapping, &json!({"userId": "u1"}))?;
//!     assert_eq!(output, Some(json!({"user_id": "u1", "plan": "free"})));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod fieldmap;
pub mod mapping;

// Re-export main types for convenience
pub use config::{EngineConfig, StrictMode, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result, ValidationError, ValidationErrors};
pub use fieldmap::{evaluate, map_event, FieldMap, FieldMapBuilder, FieldSpec};
pub use mapping::{get_field_value_keys, transform, transform_object, Mapping};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
