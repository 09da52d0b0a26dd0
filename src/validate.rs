// Eagle MCP Bridge - Argument Validator
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Checks an argument map against a tool descriptor before anything touches
// the network:
// - every required parameter present (all missing ones reported together)
// - types checked, primitives coerced per the policy below
// - enum values restricted to their allowed set
// - schema defaults filled in for absent optional parameters
// Unknown extra arguments are dropped, not rejected.
//
// Coercion policy:
//   string  <- number | boolean        (rendered as text)
//   integer <- "12" | 12.0             (parsed; fraction rejected)
//   boolean <- "true" | "false"        (case-insensitive)
//   array   <- no coercion, elements must be strings
//   objects <- no coercion, elements must be objects
//   enum    <- no coercion, exact member of the allowed set

use crate::error::ToolError;
use crate::schema::{ParamSpec, ParamType, ToolDescriptor};
use serde_json::{Map, Value};

/// Validated (or raw) tool arguments. Explicit nulls count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Accept whatever the host sent; anything but an object is an empty map
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(
                map.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            _ => Self::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    /// String the handler cannot do without. After validation this only
    /// fails when a descriptor forgot to mark the parameter required.
    pub fn require_str(&self, key: &str) -> Result<&str, ToolError> {
        self.str(key)
            .ok_or_else(|| ToolError::MissingParameter(vec![key.to_string()]))
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn strings(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).and_then(|v| v.as_array()).map(|items| {
            items.iter().filter_map(|s| s.as_str().map(str::to_string)).collect()
        })
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.set(key, value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single problem found in the arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    MissingParameter(String),
    InvalidParameterType { name: String, expected: String, actual: String },
    InvalidMode { name: String, value: String, allowed: Vec<String> },
}

impl Finding {
    fn into_error(self) -> ToolError {
        match self {
            Finding::MissingParameter(name) => ToolError::MissingParameter(vec![name]),
            Finding::InvalidParameterType { name, expected, actual } => {
                ToolError::InvalidParameterType { name, expected, actual }
            }
            Finding::InvalidMode { name, value, allowed } => {
                ToolError::InvalidMode { name, value, allowed }
            }
        }
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
    /// Coerced arguments with defaults applied. Only meaningful when valid.
    pub arguments: Arguments,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    /// Missing parameters first, aggregated into one error naming all of them;
    /// otherwise the first type or mode finding.
    pub fn into_arguments(self) -> Result<Arguments, ToolError> {
        let missing: Vec<String> = self
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::MissingParameter(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::MissingParameter(missing));
        }
        match self.findings.into_iter().next() {
            Some(finding) => Err(finding.into_error()),
            None => Ok(self.arguments),
        }
    }
}

/// Validate arguments against a tool descriptor
pub fn validate(descriptor: &ToolDescriptor, arguments: &Arguments) -> ValidationResult {
    let mut findings = Vec::new();
    let mut accepted = Arguments::new();

    for spec in &descriptor.params {
        match arguments.get(spec.name) {
            Some(value) => match coerce(spec, value) {
                Ok(v) => accepted.set(spec.name, v),
                Err(finding) => findings.push(finding),
            },
            None if spec.required => {
                findings.push(Finding::MissingParameter(spec.name.to_string()));
            }
            None => {
                if let Some(default) = &spec.default {
                    accepted.set(spec.name, default.clone());
                }
            }
        }
    }

    for key in arguments.as_map().keys() {
        if descriptor.get(key).is_none() {
            log::debug!("{}: ignoring unknown argument '{}'", descriptor.name, key);
        }
    }

    ValidationResult { findings, arguments: accepted }
}

fn coerce(spec: &ParamSpec, value: &Value) -> Result<Value, Finding> {
    let mismatch = || Finding::InvalidParameterType {
        name: spec.name.to_string(),
        expected: spec.kind.describe(),
        actual: describe_value(value),
    };

    match &spec.kind {
        ParamType::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(mismatch()),
        },
        ParamType::Integer { min, max } => {
            let n = match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(mismatch)?;
            let below = min.map(|lo| n < lo).unwrap_or(false);
            let above = max.map(|hi| n > hi).unwrap_or(false);
            if below || above {
                return Err(mismatch());
            }
            Ok(Value::from(n))
        }
        ParamType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        ParamType::Array => match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        ParamType::ObjectList => match value {
            Value::Array(items) if items.iter().all(Value::is_object) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        ParamType::Enum(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => Ok(value.clone()),
            Value::String(s) => Err(Finding::InvalidMode {
                name: spec.name.to_string(),
                value: s.clone(),
                allowed: allowed.iter().map(|a| a.to_string()).collect(),
            }),
            _ => Err(mismatch()),
        },
    }
}

/// Short description of a JSON value for error messages
fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => {
            let preview: String = s.chars().take(30).collect();
            format!("string \"{}\"", preview)
        }
        Value::Array(items) => {
            if items.iter().all(Value::is_string) {
                format!("array of {} strings", items.len())
            } else {
                "array with non-string elements".to_string()
            }
        }
        Value::Object(_) => "object".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
