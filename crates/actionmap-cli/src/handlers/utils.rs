//! Shared utilities for command handlers

use crate::cli::OutputFormat;
use crate::config::{is_yaml, Config};
use crate::error::{Error, Result};
use crate::logging::redaction;
use actionmap_core::{EngineConfig, StrictMode};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Read a JSON or YAML document, picking the parser by file extension
pub fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Document read");

    let value: Value = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| {
            debug!(error = %e, "YAML parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "YAML".to_string(),
            }
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| {
            debug!(error = %e, "JSON parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON".to_string(),
            }
        })?
    };

    trace!(
        document = %serde_json::to_string(&redaction::redacted(&value))
            .unwrap_or_else(|_| "[failed to serialize]".to_string()),
        "Document parsed"
    );

    Ok(value)
}

/// Engine settings from the configuration file with command-line overrides applied
pub fn engine_config(config: &Config, lenient: bool, no_escape: bool) -> EngineConfig {
    let mut engine = config.engine.clone();
    if lenient {
        engine.strict_mode = StrictMode::Lenient;
    }
    if no_escape {
        engine.escape_templates = false;
    }
    engine
}

/// The output format from the command line, else from the configuration file
pub fn effective_format(cli: Option<OutputFormat>, config: &Config) -> OutputFormat {
    cli.unwrap_or(config.output.format)
}
