//! Engine configuration
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default limit on mapping nesting accepted by the compiler
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How the compiler reacts to malformed mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictMode {
    /// Collect every authoring error and fail the compile
    #[default]
    Strict,
    /// Log each authoring error and keep the offending node as a literal
    Lenient,
}

impl fmt::Display for StrictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictMode::Strict => write!(f, "strict"),
            StrictMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// Settings shared by the compiler and the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compile strictness
    pub strict_mode: StrictMode,
    /// Deepest mapping nesting accepted by the compiler
    pub max_depth: usize,
    /// HTML-escape `{{placeholder}}` substitutions in templates
    pub escape_templates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: StrictMode::Strict,
            max_depth: DEFAULT_MAX_DEPTH,
            escape_templates: true,
        }
    }
}

impl EngineConfig {
    /// Configuration that never fails a compile
    pub fn lenient() -> Self {
        Self {
            strict_mode: StrictMode::Lenient,
            ..Self::default()
        }
    }

    pub fn with_strict_mode(mut self, mode: StrictMode) -> Self {
        self.strict_mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_escape_templates(mut self, escape: bool) -> Self {
        self.escape_templates = escape;
        self
    }
}
