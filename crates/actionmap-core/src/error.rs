//! Error types for the actionmap core library
//!
//! Mapping evaluation itself is total: absent or malformed data degrades into
//! omitted fields. The errors below cover the few situations that are
//! reported to callers: invalid mapping authoring caught at compile time,
//! payloads of the wrong shape, results with no mappable fields, and errors
//! raised by user-supplied `convert`/`finalize` callbacks.

use std::fmt;
use thiserror::Error;

/// Main error type for actionmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The mapped output has no fields
    #[error("Invalid request data: {message}")]
    NoMappableFields { message: String },

    /// One or more mapping authoring errors found while compiling
    #[error("Invalid mapping: {0}")]
    InvalidMapping(ValidationErrors),

    /// The payload is not a JSON object
    #[error("Invalid payload: expected {expected} but found {found}")]
    InvalidPayload { expected: String, found: String },

    /// Error raised by a user supplied convert or finalize function
    #[error(transparent)]
    Callback(anyhow::Error),

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error for a mapping that produced nothing
    pub fn no_mappable_fields() -> Self {
        Error::NoMappableFields {
            message: "payload has no supported fields".to_string(),
        }
    }

    /// Error for a payload that is not an object
    pub fn invalid_payload(found: &serde_json::Value) -> Self {
        Error::InvalidPayload {
            expected: "an object".to_string(),
            found: crate::mapping::type_name(found).to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error describes bad input or configuration rather than a
    /// failure inside a user callback
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoMappableFields { .. }
                | Error::InvalidMapping(_)
                | Error::InvalidPayload { .. }
        )
    }
}

/// A single mapping authoring error with its location in the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Keys and directive names leading to the offending node
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, path: &[String]) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// Location rendered as `/a/b/@if`
    pub fn location(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.", self.location(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// All authoring errors found in one mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::InvalidMapping(errors)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
