// Eagle MCP Bridge - Response Normalizer
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Turns partially-missing, arbitrarily nested Eagle payloads into stable text.
// Never fails: a missing or null field yields None (or the caller's fallback),
// anything else is coerced to text. Truncation is counted in chars, so a
// non-ASCII name is never cut inside a code point.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub const DEFAULT_MAX_LEN: usize = 50;
pub const ELLIPSIS: &str = "...";

/// Replace control characters (newlines included) with spaces so one value
/// always stays on one report line.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Deterministic truncation: longer than `max` -> exactly `max` chars ending in "...".
/// At or under `max` -> unchanged.
pub fn truncate(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    let suffix = ELLIPSIS.chars().count();
    if max < suffix {
        return ELLIPSIS.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - suffix).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Coerce any JSON value to text. Null -> None. Arrays join their elements
/// with ", " (each element coerced by this same rule); objects render as
/// compact JSON.
pub fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(sanitize(s)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(coerce)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(sanitize(&normalize_value(value, usize::MAX).to_string())),
    }
}

/// Recursive normalization: every string leaf sanitized and truncated,
/// maps and sequences walked by the same rule, sequence order preserved.
pub fn normalize_value(value: &Value, max: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(&sanitize(s), max)),
        Value::Array(items) => Value::Array(items.iter().map(|v| normalize_value(v, max)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v, max)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Eagle timestamps are epoch milliseconds
pub fn format_timestamp(millis: i64) -> String {
    if millis <= 0 {
        return "Unknown".to_string();
    }
    let secs = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Field renderer bound to one display length
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    pub max_len: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { max_len: DEFAULT_MAX_LEN }
    }
}

impl Normalizer {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Coerced and truncated. Use for names and other short display text.
    pub fn text(&self, value: Option<&Value>) -> Option<String> {
        value.and_then(coerce).map(|s| truncate(&s, self.max_len))
    }

    /// Blank text counts as missing here
    pub fn text_or(&self, value: Option<&Value>, fallback: &str) -> String {
        self.text(value)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Coerced, never truncated. Paths, IDs and tag lists must survive intact.
    pub fn full(&self, value: Option<&Value>) -> Option<String> {
        value.and_then(coerce)
    }

    pub fn full_or(&self, value: Option<&Value>, fallback: &str) -> String {
        self.full(value).unwrap_or_else(|| fallback.to_string())
    }

    pub fn timestamp(&self, value: Option<&Value>) -> Option<String> {
        value.and_then(Value::as_i64).map(format_timestamp)
    }

    /// Whole payload with every string leaf bounded, for raw JSON output
    pub fn value(&self, value: &Value) -> Value {
        normalize_value(value, self.max_len)
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Text(String),
    Field { label: String, value: String },
    Entry(String),
    Detail { label: String, value: String },
    Blank,
}

/// Ordered, label-line text report. Absent fields produce no line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    lines: Vec<Line>,
}

impl Report {
    pub fn new(heading: impl Into<String>) -> Self {
        Self { lines: vec![Line::Text(heading.into())] }
    }

    /// "Found N <noun>s:" or "Found 0 <noun>s." for an empty listing
    pub fn listing(count: usize, singular: &str, plural: &str) -> Self {
        let noun = if count == 1 { singular } else { plural };
        if count == 0 {
            Self::new(format!("Found 0 {}.", noun))
        } else {
            let mut report = Self::new(format!("Found {} {}:", count, noun));
            report.blank();
            report
        }
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Text(text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::Blank);
        self
    }

    /// `- Label: value`, omitted when value is None
    pub fn field(&mut self, label: &str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.lines.push(Line::Field { label: label.to_string(), value });
        }
        self
    }

    /// `- Label: value`, always present
    pub fn value(&mut self, label: &str, value: impl ToString) -> &mut Self {
        self.field(label, Some(value.to_string()))
    }

    /// `- text`, one entity in a listing
    pub fn entry(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Entry(text.into()));
        self
    }

    /// `  Label: value` under the previous entry, omitted when None
    pub fn detail(&mut self, label: &str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.lines.push(Line::Detail { label: label.to_string(), value });
        }
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Text(t) => out.push_str(t),
                Line::Field { label, value } => out.push_str(&format!("- {}: {}", label, value)),
                Line::Entry(t) => out.push_str(&format!("- {}", t)),
                Line::Detail { label, value } => out.push_str(&format!("  {}: {}", label, value)),
                Line::Blank => {}
            }
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================
