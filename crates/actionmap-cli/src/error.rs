//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! the failure modes of the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the actionmap core library
    #[error("{0}")]
    Core(#[from] actionmap_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mapping failed validation
    #[error("{count} problem(s) found in {}", path.display())]
    Invalid { path: PathBuf, count: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) if core.is_validation() => 2,
            Self::Core(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidFormat { .. } => 5,
            Self::Config(_) => 6,
            Self::Invalid { .. } => 7,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::InvalidFormat { .. })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let details = match error {
        Error::Core(actionmap_core::Error::InvalidMapping(errors)) => Some(
            errors
                .iter()
                .map(|e| format!("  {} {}", e.location(), e.message))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    };

    let headline = match error {
        Error::Core(actionmap_core::Error::InvalidMapping(errors)) => {
            format!("Invalid mapping: {} problem(s)", errors.len())
        }
        other => other.to_string(),
    };

    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), headline)
    } else {
        format!("Error: {}", headline)
    };

    if let Some(details) = details {
        message.push('\n');
        message.push_str(&details);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use actionmap_core::{ValidationError, ValidationErrors};

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::FileNotFound { path: "x".into() }.exit_code(), 4);
        assert_eq!(Error::Core(actionmap_core::Error::no_mappable_fields()).exit_code(), 2);
        assert_eq!(
            Error::Core(actionmap_core::Error::Callback(anyhow::anyhow!("boom"))).exit_code(),
            3
        );
        assert_eq!(Error::other("x").exit_code(), 99);
    }

    #[test]
    fn test_format_invalid_mapping_lists_locations() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::new(
            "has an invalid directive: @merge",
            &["oops".to_string()],
        ));
        let formatted = format_error(&Error::Core(errors.into()), false);
        assert_eq!(
            formatted,
            "Error: Invalid mapping: 1 problem(s)\n  /oops has an invalid directive: @merge"
        );
    }

    #[test]
    fn test_format_plain_error() {
        let formatted = format_error(&Error::config("bad value"), false);
        assert_eq!(formatted, "Error: Configuration error: bad value");
    }
}
