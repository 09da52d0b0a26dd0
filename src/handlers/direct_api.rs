// Eagle MCP Bridge - Direct API Passthrough
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Raw `api_*` tools: arguments go to Eagle under their own names, no
// translation. Registered only when expose_direct_api is set; these tools
// expose Eagle's wire vocabulary as-is, breaking changes included.
//
// Endpoint is derived from the tool name: api_folder_listRecent ->
// /api/folder/listRecent.

use super::{CallContext, ToolHandler};
use crate::error::ToolError;
use crate::normalize::{normalize_value, Report};
use crate::schema::{ParamSpec, ToolDescriptor};
use crate::translate::{Method, WireRequest};
use crate::validate::Arguments;

/// Strings in raw responses are bounded but far looser than report fields
const RAW_MAX_LEN: usize = 4096;

#[derive(Clone, Copy)]
enum Kind {
    Str,
    Int,
    List,
    Objects,
}

struct Passthrough {
    tool: &'static str,
    description: &'static str,
    method: Method,
    params: &'static [(&'static str, Kind, bool)],
}

use Kind::*;
use Method::{Get, Post};

static PASSTHROUGH: &[Passthrough] = &[
    // Application
    Passthrough { tool: "api_application_info", description: "Get Eagle application info.", method: Get, params: &[] },
    // Folder
    Passthrough {
        tool: "api_folder_create",
        description: "Create a new folder.",
        method: Post,
        params: &[("folderName", Str, true), ("parent", Str, false)],
    },
    Passthrough {
        tool: "api_folder_rename",
        description: "Rename a folder.",
        method: Post,
        params: &[("folderId", Str, true), ("newName", Str, true)],
    },
    Passthrough {
        tool: "api_folder_update",
        description: "Update folder details.",
        method: Post,
        params: &[
            ("folderId", Str, true),
            ("newName", Str, false),
            ("newDescription", Str, false),
            ("newColor", Str, false),
        ],
    },
    Passthrough { tool: "api_folder_list", description: "List all folders.", method: Get, params: &[] },
    Passthrough { tool: "api_folder_listRecent", description: "List recent folders.", method: Get, params: &[] },
    // Item
    Passthrough {
        tool: "api_item_addFromURL",
        description: "Add item from a URL.",
        method: Post,
        params: &[
            ("url", Str, true),
            ("name", Str, false),
            ("folderId", Str, false),
            ("tags", List, false),
            ("annotation", Str, false),
        ],
    },
    Passthrough {
        tool: "api_item_addFromURLs",
        description: "Add items from multiple URLs.",
        method: Post,
        params: &[("items", Objects, true), ("folderId", Str, false)],
    },
    Passthrough {
        tool: "api_item_addFromPath",
        description: "Add item from a local path.",
        method: Post,
        params: &[
            ("path", Str, true),
            ("name", Str, false),
            ("folderId", Str, false),
            ("tags", List, false),
        ],
    },
    Passthrough {
        tool: "api_item_addBookmark",
        description: "Add a bookmark.",
        method: Post,
        params: &[
            ("url", Str, true),
            ("name", Str, false),
            ("base64", Str, false),
            ("tags", List, false),
            ("folderId", Str, false),
        ],
    },
    Passthrough { tool: "api_item_info", description: "Get item details.", method: Get, params: &[("id", Str, true)] },
    Passthrough {
        tool: "api_item_list",
        description: "Search for items.",
        method: Get,
        params: &[
            ("limit", Int, false),
            ("keyword", Str, false),
            ("folders", Str, false),
            ("tags", Str, false),
            ("ext", Str, false),
        ],
    },
    Passthrough {
        tool: "api_item_moveToTrash",
        description: "Move items to trash.",
        method: Post,
        params: &[("itemIds", List, true)],
    },
    Passthrough {
        tool: "api_item_update",
        description: "Update item metadata.",
        method: Post,
        params: &[
            ("id", Str, true),
            ("tags", List, false),
            ("annotation", Str, false),
            ("star", Int, false),
            ("url", Str, false),
        ],
    },
    // Library
    Passthrough { tool: "api_library_info", description: "Get library info.", method: Get, params: &[] },
    Passthrough { tool: "api_library_history", description: "Get library history.", method: Get, params: &[] },
    Passthrough {
        tool: "api_library_switch",
        description: "Switch to a different library.",
        method: Post,
        params: &[("libraryPath", Str, true)],
    },
];

fn endpoint_for(tool: &str) -> String {
    let rest = tool.strip_prefix("api_").unwrap_or(tool);
    format!("/api/{}", rest.replace('_', "/"))
}

fn descriptor(entry: &Passthrough) -> ToolDescriptor {
    entry.params.iter().fold(
        ToolDescriptor::new(entry.tool, entry.description),
        |tool, &(name, kind, required)| {
            let spec = match kind {
                Str => ParamSpec::string(name, name),
                Int => ParamSpec::integer(name, name),
                List => ParamSpec::array(name, name),
                Objects => ParamSpec::objects(name, name),
            };
            tool.param(if required { spec.required() } else { spec })
        },
    )
}

pub struct DirectApiHandler;

impl ToolHandler for DirectApiHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["api_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        PASSTHROUGH.iter().map(descriptor).collect()
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        let entry = PASSTHROUGH
            .iter()
            .find(|p| p.tool == name)
            .ok_or_else(|| ToolError::unknown_tool(name))?;
        let request = WireRequest {
            endpoint: endpoint_for(entry.tool),
            method: entry.method,
            payload: args.as_map().clone(),
        };
        log::info!("passthrough {} {}", request.method, request.endpoint);

        let data = ctx.send(&request)?;
        let pretty = serde_json::to_string_pretty(&normalize_value(&data, RAW_MAX_LEN))
            .map_err(|e| ToolError::Local(format!("cannot render response: {}", e)))?;
        Ok(Report::new(pretty))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockApi;
    use crate::config::BridgeConfig;
    use crate::error::ErrorKind;
    use crate::handlers::testing::run;
    use serde_json::json;

    #[test]
    fn endpoints_follow_tool_names() {
        assert_eq!(endpoint_for("api_folder_listRecent"), "/api/folder/listRecent");
        assert_eq!(endpoint_for("api_application_info"), "/api/application/info");
        assert_eq!(endpoint_for("api_item_addFromURLs"), "/api/item/addFromURLs");
    }

    #[test]
    fn seventeen_unique_tools() {
        let tools = DirectApiHandler.tools();
        assert_eq!(tools.len(), 17);
        let mut names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 17);
        assert!(names.iter().all(|n| n.starts_with("api_")));
    }

    #[test]
    fn get_forwards_arguments_as_query() {
        let api = MockApi::new().respond_data("/api/item/list", json!([{"id": "I1"}]));
        let out = run(
            &DirectApiHandler,
            &api,
            &BridgeConfig::default(),
            "api_item_list",
            json!({"keyword": "cat", "limit": 3, "bogus": 1}),
        )
        .unwrap();
        assert!(out.contains("\"id\": \"I1\""));
        let call = &api.calls()[0];
        assert_eq!(call.method, Method::Get);
        assert_eq!(call.payload, json!({"keyword": "cat", "limit": "3"}));
    }

    #[test]
    fn post_forwards_arguments_verbatim() {
        let api = MockApi::new();
        run(
            &DirectApiHandler,
            &api,
            &BridgeConfig::default(),
            "api_item_addFromURLs",
            json!({"items": [{"url": "https://x/1.png", "name": "one"}], "folderId": "F1"}),
        )
        .unwrap();
        let call = &api.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.endpoint, "/api/item/addFromURLs");
        assert_eq!(
            call.payload,
            json!({"items": [{"url": "https://x/1.png", "name": "one"}], "folderId": "F1"})
        );
    }

    #[test]
    fn required_wire_names_are_enforced() {
        let api = MockApi::new();
        let err = run(&DirectApiHandler, &api, &BridgeConfig::default(), "api_folder_rename", json!({}))
            .unwrap_err();
        assert_eq!(err, ToolError::MissingParameter(vec!["folderId".into(), "newName".into()]));
    }

    #[test]
    fn rejection_is_surfaced() {
        let api = MockApi::new().respond("/api/library/switch", json!({"status": "error", "message": "no such library"}));
        let err = run(
            &DirectApiHandler,
            &api,
            &BridgeConfig::default(),
            "api_library_switch",
            json!({"libraryPath": "/nope"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(err.to_string().contains("no such library"));
    }
}
