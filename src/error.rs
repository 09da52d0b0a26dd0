// Eagle MCP Bridge - Error Taxonomy
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every stage returns ToolError. The dispatcher is the only place that turns
// one into text; nothing here propagates past it as a panic.

use std::fmt;
use thiserror::Error;

/// Discriminant of a ToolError, stable for hosts that need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingParameter,
    InvalidParameterType,
    InvalidMode,
    NothingToUpdate,
    UnknownTool,
    RemoteUnavailable,
    RemoteRejected,
    NotFound,
    Local,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MissingParameter => "MissingParameter",
            ErrorKind::InvalidParameterType => "InvalidParameterType",
            ErrorKind::InvalidMode => "InvalidMode",
            ErrorKind::NothingToUpdate => "NothingToUpdate",
            ErrorKind::UnknownTool => "UnknownTool",
            ErrorKind::RemoteUnavailable => "RemoteUnavailable",
            ErrorKind::RemoteRejected => "RemoteRejected",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Local => "Local",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    /// One or more required parameters absent. Always names every one of them.
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    #[error("parameter '{name}' expected {expected}, got {actual}")]
    InvalidParameterType {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("invalid value '{value}' for '{name}' (allowed: {})", .allowed.join(", "))]
    InvalidMode {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    /// An update tool received none of its optional update fields.
    #[error("nothing to update: provide at least one of {}", .0.join(", "))]
    NothingToUpdate(Vec<String>),

    #[error("unknown tool '{name}'{}", .hint.as_deref().map(|h| format!(" ({})", h)).unwrap_or_default())]
    UnknownTool { name: String, hint: Option<String> },

    /// Transport failure: timeout, refused connection, unreadable body.
    #[error("Eagle API unreachable: {0}")]
    RemoteUnavailable(String),

    /// The API answered, but with a non-2xx code or a non-success status.
    #[error("Eagle API rejected {endpoint}{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    RemoteRejected {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Local filesystem trouble (image files referenced by the API).
    #[error("{0}")]
    Local(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::MissingParameter(_) => ErrorKind::MissingParameter,
            ToolError::InvalidParameterType { .. } => ErrorKind::InvalidParameterType,
            ToolError::InvalidMode { .. } => ErrorKind::InvalidMode,
            ToolError::NothingToUpdate(_) => ErrorKind::NothingToUpdate,
            ToolError::UnknownTool { .. } => ErrorKind::UnknownTool,
            ToolError::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,
            ToolError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            ToolError::NotFound { .. } => ErrorKind::NotFound,
            ToolError::Local(_) => ErrorKind::Local,
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        ToolError::UnknownTool { name: name.to_string(), hint: None }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ToolError::NotFound { entity: entity.to_string(), id: id.to_string() }
    }

    /// Caller-input errors are detected before any remote call is made.
    pub fn is_caller_input(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingParameter
                | ErrorKind::InvalidParameterType
                | ErrorKind::InvalidMode
                | ErrorKind::NothingToUpdate
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
