// Eagle MCP Bridge - Update Resolver
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Eagle's update endpoint only knows "set". Add/remove over a list-valued
// field is resolved here: read the current list, compute the final list,
// send that as a replace.
//
// Read-then-write is not atomic. A concurrent writer between the baseline
// read and the update is overwritten. Eagle offers no compare-and-set, so the
// window stays open; callers needing strict semantics serialize themselves.

use crate::error::ToolError;
use std::fmt;
use std::str::FromStr;

pub const MODES: &[&str] = &["replace", "add", "remove"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    #[default]
    Replace,
    Add,
    Remove,
}

impl UpdateMode {
    /// Only replace can skip the baseline read
    pub fn needs_baseline(&self) -> bool {
        !matches!(self, UpdateMode::Replace)
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateMode::Replace => "replace",
            UpdateMode::Add => "add",
            UpdateMode::Remove => "remove",
        })
    }
}

impl FromStr for UpdateMode {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(UpdateMode::Replace),
            "add" => Ok(UpdateMode::Add),
            "remove" => Ok(UpdateMode::Remove),
            other => Err(ToolError::InvalidMode {
                name: "mode".to_string(),
                value: other.to_string(),
                allowed: MODES.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

/// A requested change to one list-valued field of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIntent {
    pub target_id: String,
    pub field: &'static str,
    pub mode: UpdateMode,
    pub values: Vec<String>,
}

/// Final list for a mode. Order: current order first, then new values in the
/// order supplied. Duplicates are collapsed in every mode.
pub fn resolve(mode: UpdateMode, current: &[String], supplied: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    match mode {
        UpdateMode::Replace => {
            for v in supplied {
                push_unique(&mut out, v);
            }
        }
        UpdateMode::Add => {
            for v in current.iter().chain(supplied) {
                push_unique(&mut out, v);
            }
        }
        UpdateMode::Remove => {
            for v in current.iter().filter(|v| !supplied.contains(v)) {
                push_unique(&mut out, v);
            }
        }
    }
    out
}

fn push_unique(out: &mut Vec<String>, value: &str) {
    if !out.iter().any(|v| v == value) {
        out.push(value.to_string());
    }
}

/// Resolve an intent, fetching the baseline only when the mode needs it.
/// A failed baseline read aborts: no update is computed, none is sent.
pub fn resolve_intent<F>(intent: &UpdateIntent, fetch_current: F) -> Result<Vec<String>, ToolError>
where
    F: FnOnce(&str) -> Result<Vec<String>, ToolError>,
{
    if !intent.mode.needs_baseline() {
        return Ok(resolve(UpdateMode::Replace, &[], &intent.values));
    }
    let current = fetch_current(&intent.target_id)?;
    log::debug!(
        "{} {} on {}: baseline {:?} + {:?}",
        intent.mode,
        intent.field,
        intent.target_id,
        current,
        intent.values
    );
    Ok(resolve(intent.mode, &current, &intent.values))
}

// ============================================================================
// TESTS
// ============================================================================
