// Eagle MCP Bridge - Library Tools
// Copyright 2026 Joseph Stone - All Rights Reserved

use super::{entities, CallContext, ToolHandler};
use crate::error::ToolError;
use crate::normalize::Report;
use crate::schema::ToolDescriptor;
use crate::validate::Arguments;
use serde_json::Value;

pub struct LibraryHandler;

impl ToolHandler for LibraryHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["library_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![ToolDescriptor::new("library_info", "Get information about the current Eagle library")]
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        match name {
            "library_info" => info(args, ctx),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }
}

/// Folder tree and timestamps sit beside `library`, not inside it
fn lookup<'v>(data: &'v Value, library: &'v Value, key: &str) -> Option<&'v Value> {
    data.get(key).or_else(|| library.get(key))
}

fn info(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let data = ctx.call("library_info", args)?;
    let library = data.get("library").unwrap_or(&Value::Null);

    let folder_count = lookup(&data, library, "folders")
        .filter(|f| f.is_array())
        .map(|f| entities(f).len());

    let n = &ctx.normalizer;
    let mut report = Report::new("Library Information:");
    report
        .value("Name", n.text_or(library.get("name"), "Unknown"))
        .value("Path", n.full_or(library.get("path"), "Unknown"))
        .field("Folders", folder_count.map(|c| c.to_string()))
        .field("Last Modified", n.timestamp(lookup(&data, library, "modificationTime")))
        .field("Application Version", n.text(lookup(&data, library, "applicationVersion")));
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
