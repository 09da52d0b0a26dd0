// Eagle MCP Bridge - Tool Schemas
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Declarative tool descriptors. Built once when the dispatcher is constructed,
// never mutated afterwards. Rendered to JSON Schema for tools/list.

use serde_json::{json, Map, Value};

/// Parameter type
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    /// Optional inclusive range
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    /// Array of strings
    Array,
    /// Array of JSON objects, passed through untouched
    ObjectList,
    /// String restricted to a fixed set
    Enum(&'static [&'static str]),
}

impl ParamType {
    /// Human name used in validation messages
    pub fn describe(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Integer { min: Some(lo), max: Some(hi) } => format!("integer in {}..={}", lo, hi),
            ParamType::Integer { min: Some(lo), max: None } => format!("integer >= {}", lo),
            ParamType::Integer { min: None, max: Some(hi) } => format!("integer <= {}", hi),
            ParamType::Integer { .. } => "integer".to_string(),
            ParamType::Boolean => "boolean".to_string(),
            ParamType::Array => "array of strings".to_string(),
            ParamType::ObjectList => "array of objects".to_string(),
            ParamType::Enum(values) => format!("one of {}", values.join("|")),
        }
    }
}

/// One parameter of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self { name, description, kind, required: false, default: None }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Integer { min: None, max: None }, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::Array, description)
    }

    pub fn objects(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamType::ObjectList, description)
    }

    pub fn one_of(name: &'static str, values: &'static [&'static str], description: &'static str) -> Self {
        Self::new(name, ParamType::Enum(values), description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn range(mut self, lo: i64, hi: i64) -> Self {
        if let ParamType::Integer { .. } = self.kind {
            self.kind = ParamType::Integer { min: Some(lo), max: Some(hi) };
        }
        self
    }

    fn json_schema(&self) -> Value {
        let mut prop = Map::new();
        match &self.kind {
            ParamType::String => {
                prop.insert("type".into(), json!("string"));
            }
            ParamType::Integer { min, max } => {
                prop.insert("type".into(), json!("integer"));
                if let Some(lo) = min {
                    prop.insert("minimum".into(), json!(lo));
                }
                if let Some(hi) = max {
                    prop.insert("maximum".into(), json!(hi));
                }
            }
            ParamType::Boolean => {
                prop.insert("type".into(), json!("boolean"));
            }
            ParamType::Array => {
                prop.insert("type".into(), json!("array"));
                prop.insert("items".into(), json!({"type": "string"}));
            }
            ParamType::ObjectList => {
                prop.insert("type".into(), json!("array"));
                prop.insert("items".into(), json!({"type": "object"}));
            }
            ParamType::Enum(values) => {
                prop.insert("type".into(), json!("string"));
                prop.insert("enum".into(), json!(values));
            }
        }
        prop.insert("description".into(), json!(self.description));
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        Value::Object(prop)
    }
}

/// A tool as exposed to the calling agent
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description, params: Vec::new() }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Required parameter names, in declaration order
    pub fn required(&self) -> Vec<&'static str> {
        self.params.iter().filter(|p| p.required).map(|p| p.name).collect()
    }

    /// MCP tool definition with a JSON-Schema input schema
    pub fn to_mcp(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(p.name.to_string(), p.json_schema());
        }
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": self.required(),
            }
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
