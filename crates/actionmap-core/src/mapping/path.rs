//! Field paths into event payloads
//!
//! Paths are written `$.properties.products[0].sku`. The `$.` prefix is
//! optional, so template placeholders such as `{{traits.email}}` use the same
//! parser. Segments are separated by `.`; spaces belong to the key
//! (`$.integrations.Actions Amplitude.session_id`). A numeric `[n]` suffix or
//! a numeric segment indexes into an array. Quoted bracket keys are not part
//! of the syntax and simply never match.
//!
//! Copyright (c) 2025 Actionmap Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;
use std::fmt;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key (or array index when the key is numeric)
    Key(String),
    /// Array index from `[n]`
    Index(usize),
}

/// A parsed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a path. Parsing never fails; unusual text just yields keys that
    /// are unlikely to exist.
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: parse_segments(raw),
        }
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether the path selects the whole payload
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Look the path up in `data`; `None` when any segment is missing
    pub fn lookup<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(data, |current, segment| step(current, segment))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn step<'a>(current: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn parse_segments(raw: &str) -> Vec<PathSegment> {
    let body = if raw == "$" {
        ""
    } else if let Some(rest) = raw.strip_prefix("$.") {
        rest
    } else if let Some(rest) = raw.strip_prefix('$').filter(|rest| rest.starts_with('[')) {
        rest
    } else {
        raw
    };

    if body.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for part in body.split('.') {
        parse_part(part, &mut segments);
    }
    segments
}

/// Split `items[0][1]` into a key followed by indexes. Anything that is not a
/// well formed numeric suffix stays part of the key.
fn parse_part(part: &str, segments: &mut Vec<PathSegment>) {
    let mut key_end = part.len();
    let mut indexes = Vec::new();

    let mut rest = part;
    while let Some(stripped) = rest.strip_suffix(']') {
        let Some(open) = stripped.rfind('[') else {
            break;
        };
        let Ok(index) = stripped[open + 1..].parse::<usize>() else {
            break;
        };
        indexes.push(index);
        rest = &stripped[..open];
        key_end = open;
    }

    let key = &part[..key_end];
    if !key.is_empty() || indexes.is_empty() {
        segments.push(PathSegment::Key(key.to_string()));
    }
    segments.extend(indexes.into_iter().rev().map(PathSegment::Index));
}
