// Eagle MCP Bridge - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod config;
pub mod error;
pub mod mcp;
pub mod validate;

// ============================================================================
// TOOL PIPELINE - schema -> validate -> translate -> resolve -> call -> report
// ============================================================================

/// Tool descriptors and JSON-Schema rendering
pub mod schema;

/// Logical operation -> Eagle endpoint mapping
pub mod translate;

/// Tag update modes (replace/add/remove)
pub mod resolve;

/// Eagle HTTP client and session factory
pub mod client;

/// Display normalization and text reports
pub mod normalize;

/// Image files: MIME detection, base64, thumbnail paths
pub mod media;

/// Tool groups, one per name prefix
pub mod handlers;

/// Prefix routing and stage tracking
pub mod dispatch;
