//! `@template` strings
//!
//! A template is plain text with `{{key.path}}` placeholders. Substituted
//! values are HTML-escaped unless the placeholder uses triple braces
//! (`{{{key.path}}}`) or escaping is turned off in the engine config.
//! Missing keys render as empty strings.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use super::path::FieldPath;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{(\{)?\s*([^{}]*?)\s*\}?\}\}").expect("placeholder pattern is valid")
    })
}

/// Piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Variable {
        key: String,
        path: FieldPath,
        /// False for `{{{raw}}}` placeholders
        escape: bool,
    },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for captures in placeholder_regex().captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(source[last..whole.start()].to_string()));
            }
            let key = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
            segments.push(Segment::Variable {
                key: key.to_string(),
                path: FieldPath::parse(key),
                escape: captures.get(1).is_none(),
            });
            last = whole.end();
        }

        if last < source.len() {
            segments.push(Segment::Text(source[last..].to_string()));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder keys in order of appearance
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable { key, .. } => Some(key.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Render against `data`
    pub fn render(&self, data: &Value, escape_enabled: bool) -> String {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Variable { path, escape, .. } => {
                    let rendered = path.lookup(data).map(display_value).unwrap_or_default();
                    if *escape && escape_enabled {
                        output.push_str(&escape_html(&rendered));
                    } else {
                        output.push_str(&rendered);
                    }
                }
            }
        }
        output
    }
}

/// Text form of a value inside a template
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Escape the characters mustache escapes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '/' => escaped.push_str("&#x2F;"),
            '`' => escaped.push_str("&#x60;"),
            '=' => escaped.push_str("&#x3D;"),
            other => escaped.push(other),
        }
    }
    escaped
}
