// Eagle MCP Bridge - Parameter Translator
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Logical argument names -> Eagle wire field names, per operation.
// ROUTES is the only place a wire field name or endpoint appears; handlers
// never build payloads by hand. Operations that share a logical meaning share
// the same FieldMap constants, so two call sites cannot drift apart.
//
// Folder update: the API has been seen accepting several id/name pairings.
// This table commits to `folderId` + `newName` (+ `newDescription`) on
// /api/folder/update for both folder_update and folder_rename.

use crate::error::ToolError;
use crate::validate::Arguments;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// How an argument reaches the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Sent unchanged under the wire name
    Same,
    /// Scalar wrapped into a one-element array
    Wrap,
    /// Consumed by the handler, never sent
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub arg: &'static str,
    pub wire: &'static str,
    pub shape: Shape,
}

impl FieldMap {
    const fn same(arg: &'static str, wire: &'static str) -> Self {
        Self { arg, wire, shape: Shape::Same }
    }

    const fn wrap(arg: &'static str, wire: &'static str) -> Self {
        Self { arg, wire, shape: Shape::Wrap }
    }

    const fn local(arg: &'static str) -> Self {
        Self { arg, wire: "", shape: Shape::Local }
    }
}

/// One logical operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub operation: &'static str,
    pub endpoint: &'static str,
    pub method: Method,
    pub fields: &'static [FieldMap],
}

impl Route {
    pub fn field(&self, arg: &str) -> Option<&FieldMap> {
        self.fields.iter().find(|f| f.arg == arg)
    }
}

/// Outgoing request, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    pub endpoint: String,
    pub method: Method,
    /// Sorted by key; identical input always serializes identically
    pub payload: Map<String, Value>,
}

impl WireRequest {
    /// Payload flattened into query pairs for GET. Arrays become comma lists.
    pub fn query(&self) -> Vec<(String, String)> {
        self.payload
            .iter()
            .map(|(k, v)| (k.clone(), query_value(v)))
            .collect()
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

// ============================================================================
// MAPPING TABLE
// ============================================================================

const ITEM_ID: FieldMap = FieldMap::same("item_id", "id");
const FOLDER_ID: FieldMap = FieldMap::same("folder_id", "folderId");
const LIMIT: FieldMap = FieldMap::same("limit", "limit");
const KEYWORD: FieldMap = FieldMap::same("keyword", "keyword");

const FOLDER_UPDATE: &str = "/api/folder/update";
const ITEM_UPDATE: &str = "/api/item/update";
const ITEM_INFO: &str = "/api/item/info";
const ITEM_LIST: &str = "/api/item/list";
const ITEM_THUMBNAIL: &str = "/api/item/thumbnail";
const FOLDER_LIST: &str = "/api/folder/list";
const APPLICATION_INFO: &str = "/api/application/info";

/// Every logical operation the bridge performs. Tool names plus a few
/// internal follow-up reads (`folder_items`, `item_thumbnail`).
pub static ROUTES: &[Route] = &[
    // ====== FOLDERS ======
    Route {
        operation: "folder_list",
        endpoint: FOLDER_LIST,
        method: Method::Get,
        fields: &[FieldMap::local("limit")],
    },
    Route {
        operation: "folder_search",
        endpoint: FOLDER_LIST,
        method: Method::Get,
        fields: &[FieldMap::local("keyword"), FieldMap::local("limit")],
    },
    Route {
        operation: "folder_info",
        endpoint: FOLDER_LIST,
        method: Method::Get,
        fields: &[FieldMap::local("folder_id")],
    },
    Route {
        operation: "folder_items",
        endpoint: ITEM_LIST,
        method: Method::Get,
        fields: &[FieldMap::same("folder_id", "folders"), LIMIT],
    },
    Route {
        operation: "folder_create",
        endpoint: "/api/folder/create",
        method: Method::Post,
        fields: &[
            FieldMap::same("folder_name", "folderName"),
            FieldMap::same("parent_id", "parent"),
        ],
    },
    Route {
        operation: "folder_update",
        endpoint: FOLDER_UPDATE,
        method: Method::Post,
        fields: &[
            FOLDER_ID,
            FieldMap::same("folder_name", "newName"),
            FieldMap::same("description", "newDescription"),
        ],
    },
    Route {
        operation: "folder_rename",
        endpoint: FOLDER_UPDATE,
        method: Method::Post,
        fields: &[FOLDER_ID, FieldMap::same("new_name", "newName")],
    },
    // ====== ITEMS ======
    Route {
        operation: "item_search",
        endpoint: ITEM_LIST,
        method: Method::Get,
        fields: &[KEYWORD, LIMIT],
    },
    Route {
        operation: "item_info",
        endpoint: ITEM_INFO,
        method: Method::Get,
        fields: &[ITEM_ID],
    },
    Route {
        operation: "item_thumbnail",
        endpoint: ITEM_THUMBNAIL,
        method: Method::Get,
        fields: &[ITEM_ID],
    },
    Route {
        operation: "item_move_to_folder",
        endpoint: ITEM_UPDATE,
        method: Method::Post,
        fields: &[ITEM_ID, FieldMap::wrap("folder_id", "folders")],
    },
    Route {
        operation: "item_update_tags",
        endpoint: ITEM_UPDATE,
        method: Method::Post,
        fields: &[ITEM_ID, FieldMap::same("tags", "tags"), FieldMap::local("mode")],
    },
    Route {
        operation: "item_rename",
        endpoint: ITEM_UPDATE,
        method: Method::Post,
        fields: &[ITEM_ID, FieldMap::same("new_name", "name")],
    },
    Route {
        operation: "item_update_metadata",
        endpoint: ITEM_UPDATE,
        method: Method::Post,
        fields: &[
            ITEM_ID,
            FieldMap::same("annotation", "annotation"),
            FieldMap::same("star", "star"),
        ],
    },
    Route {
        operation: "item_delete",
        endpoint: "/api/item/moveToTrash",
        method: Method::Post,
        fields: &[FieldMap::wrap("item_id", "itemIds")],
    },
    // ====== LIBRARY ======
    Route {
        operation: "library_info",
        endpoint: "/api/library/info",
        method: Method::Get,
        fields: &[],
    },
    // ====== IMAGES ======
    Route {
        operation: "image_get_base64",
        endpoint: ITEM_INFO,
        method: Method::Get,
        fields: &[ITEM_ID, FieldMap::local("use_thumbnail")],
    },
    Route {
        operation: "image_get_filepath",
        endpoint: ITEM_INFO,
        method: Method::Get,
        fields: &[ITEM_ID],
    },
    Route {
        operation: "image_analyze_prompt",
        endpoint: ITEM_INFO,
        method: Method::Get,
        fields: &[
            ITEM_ID,
            FieldMap::local("analysis_prompt"),
            FieldMap::local("use_thumbnail"),
        ],
    },
    Route {
        operation: "thumbnail_get_base64",
        endpoint: ITEM_THUMBNAIL,
        method: Method::Get,
        fields: &[ITEM_ID],
    },
    // ====== ADMIN ======
    Route {
        operation: "health_check",
        endpoint: APPLICATION_INFO,
        method: Method::Get,
        fields: &[],
    },
];

/// Route for an operation
pub fn route(operation: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.operation == operation)
}

/// Build the wire request for an operation. Pure: no I/O, same input, same output.
pub fn translate(operation: &str, args: &Arguments) -> Result<WireRequest, ToolError> {
    let route = route(operation).ok_or_else(|| ToolError::unknown_tool(operation))?;

    let mut payload = Map::new();
    for field in route.fields {
        let value = match args.get(field.arg) {
            Some(v) => v,
            None => continue,
        };
        match field.shape {
            Shape::Same => {
                payload.insert(field.wire.to_string(), value.clone());
            }
            Shape::Wrap => {
                let wrapped = match value {
                    Value::Array(_) => value.clone(),
                    other => Value::Array(vec![other.clone()]),
                };
                payload.insert(field.wire.to_string(), wrapped);
            }
            Shape::Local => {}
        }
    }

    Ok(WireRequest {
        endpoint: route.endpoint.to_string(),
        method: route.method,
        payload,
    })
}

// ============================================================================
// TESTS
// ============================================================================
