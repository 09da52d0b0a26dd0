// Eagle MCP Bridge - Folder Tools
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// folder_list, folder_search, folder_info, folder_create, folder_update,
// folder_rename. Eagle has no folder lookup endpoint: search and info walk
// the full tree from /api/folder/list, children included.

use super::{entities, matches_listing, raw_str, CallContext, ToolHandler};
use crate::error::ToolError;
use crate::normalize::Report;
use crate::schema::{ParamSpec, ToolDescriptor};
use crate::validate::Arguments;
use serde_json::{json, Value};

/// Sample names shown by folder_info
const SAMPLE_ITEMS: usize = 5;
const SAMPLE_FETCH: u32 = 10;

pub struct FolderHandler;

impl ToolHandler for FolderHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["folder_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("folder_list", "List all top-level folders in the Eagle library")
                .param(ParamSpec::integer("limit", "Maximum number of folders to return")),
            ToolDescriptor::new("folder_search", "Search for folders by name, including subfolders")
                .param(ParamSpec::string("keyword", "Search keyword for folder name").required())
                .param(ParamSpec::integer("limit", "Maximum number of folders to return")),
            ToolDescriptor::new("folder_info", "Get detailed information about a specific folder")
                .param(ParamSpec::string("folder_id", "The ID of the folder").required()),
            ToolDescriptor::new("folder_create", "Create a new folder in the Eagle library")
                .param(ParamSpec::string("folder_name", "Name of the new folder").required())
                .param(ParamSpec::string("parent_id", "Parent folder ID (optional)")),
            ToolDescriptor::new("folder_update", "Update folder properties (name, description)")
                .param(ParamSpec::string("folder_id", "The ID of the folder to update").required())
                .param(ParamSpec::string("folder_name", "New folder name (optional)"))
                .param(ParamSpec::string("description", "New folder description (optional)")),
            ToolDescriptor::new("folder_rename", "Rename a folder")
                .param(ParamSpec::string("folder_id", "The ID of the folder to rename").required())
                .param(ParamSpec::string("new_name", "New name for the folder").required()),
        ]
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        match name {
            "folder_list" => list(args, ctx),
            "folder_search" => search(args, ctx),
            "folder_info" => info(args, ctx),
            "folder_create" => create(args, ctx),
            "folder_update" => update(args, ctx),
            "folder_rename" => rename(args, ctx),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }
}

/// Depth-first, parents before their children
fn flatten<'v>(folders: Vec<&'v Value>, out: &mut Vec<&'v Value>) {
    for folder in folders {
        out.push(folder);
        if let Some(children) = folder.get("children") {
            flatten(entities(children), out);
        }
    }
}

fn all_folders(tree: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    flatten(entities(tree), &mut out);
    out
}

fn folder_entries(report: &mut Report, folders: &[&Value], ctx: &CallContext<'_>) {
    let n = &ctx.normalizer;
    for folder in folders {
        report.entry(format!(
            "{} (ID: {})",
            n.text_or(folder.get("name"), "Unnamed Folder"),
            n.full_or(folder.get("id"), "Unknown")
        ));
    }
}

fn list(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let limit = ctx.config.folder_limit(args.i64("limit")) as usize;
    let data = ctx.call("folder_list", args)?;
    let folders = entities(&data);

    let mut report = Report::listing(folders.len(), "folder", "folders");
    let shown: Vec<&Value> = folders.iter().copied().take(limit).collect();
    folder_entries(&mut report, &shown, ctx);
    if shown.len() < folders.len() {
        report.blank().text(format!("Showing first {} of {}.", shown.len(), folders.len()));
    }
    Ok(report)
}

fn search(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let keyword = args.require_str("keyword")?;
    let limit = ctx.config.folder_limit(args.i64("limit")) as usize;
    let data = ctx.call("folder_search", args)?;

    let needle = keyword.to_lowercase();
    let matching: Vec<&Value> = all_folders(&data)
        .into_iter()
        .filter(|f| {
            raw_str(f, "name")
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect();

    let mut report = matches_listing(matching.len(), "folder", "folders", keyword, ctx);
    let shown: Vec<&Value> = matching.iter().copied().take(limit).collect();
    folder_entries(&mut report, &shown, ctx);
    if shown.len() < matching.len() {
        report.blank().text(format!("Showing first {} of {}.", shown.len(), matching.len()));
    }
    Ok(report)
}

fn info(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let folder_id = args.require_str("folder_id")?;
    let data = ctx.call("folder_info", args)?;
    let folder = all_folders(&data)
        .into_iter()
        .find(|f| raw_str(f, "id") == Some(folder_id))
        .ok_or_else(|| ToolError::not_found("folder", folder_id))?;

    let sample_args = Arguments::new()
        .with("folder_id", json!(folder_id))
        .with("limit", json!(SAMPLE_FETCH));
    let items = ctx.call("folder_items", &sample_args)?;
    let items = entities(&items);

    let n = &ctx.normalizer;
    let item_count = folder
        .get("imageCount")
        .and_then(Value::as_u64)
        .map(|c| c.to_string())
        .unwrap_or_else(|| items.len().to_string());
    let samples: Vec<String> = items
        .iter()
        .take(SAMPLE_ITEMS)
        .map(|item| n.text_or(item.get("name"), "Unnamed Item"))
        .collect();
    let subfolders = folder.get("children").map(|c| entities(c).len()).unwrap_or(0);

    let mut report = Report::new("Folder Information:");
    report
        .value("Name", n.text_or(folder.get("name"), "Unnamed Folder"))
        .value("ID", folder_id)
        .value("Items", item_count)
        .field("Description", n.text(folder.get("description")).filter(|d| !d.trim().is_empty()))
        .field("Subfolders", (subfolders > 0).then(|| subfolders.to_string()))
        .field("Modified", n.timestamp(folder.get("modificationTime")))
        .field("Sample items", (!samples.is_empty()).then(|| samples.join(", ")));
    Ok(report)
}

fn create(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let folder_name = args.require_str("folder_name")?;
    let data = ctx.call("folder_create", args)?;

    let n = &ctx.normalizer;
    let mut report = Report::new("Folder created successfully:");
    report
        .value("Name", n.text(data.get("name")).unwrap_or_else(|| folder_name.to_string()))
        .value("ID", n.full_or(data.get("id"), "Unknown"))
        .field("Parent ID", args.str("parent_id").filter(|p| !p.is_empty()).map(str::to_string))
        .value(
            "Creation Time",
            n.timestamp(data.get("modificationTime")).unwrap_or_else(|| "Unknown".to_string()),
        );
    Ok(report)
}

fn update(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let folder_id = args.require_str("folder_id")?;
    if !args.has("folder_name") && !args.has("description") {
        return Err(ToolError::NothingToUpdate(vec![
            "folder_name".to_string(),
            "description".to_string(),
        ]));
    }
    ctx.call("folder_update", args)?;

    let n = &ctx.normalizer;
    let mut report = Report::new("Folder updated successfully:");
    report
        .value("Folder ID", folder_id)
        .field("New Name", n.full(args.get("folder_name")))
        .field("New Description", n.full(args.get("description")));
    Ok(report)
}

fn rename(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let folder_id = args.require_str("folder_id")?;
    let new_name = args.require_str("new_name")?;
    ctx.call("folder_rename", args)?;

    let mut report = Report::new("Folder renamed successfully:");
    report.value("Folder ID", folder_id).value("New Name", new_name);
    Ok(report)
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
    use crate::translate::Method;

    fn tree() -> Value {
        json!([
            {"id": "F1", "name": "Photos", "imageCount": 42, "description": "Travel shots",
             "children": [
                {"id": "F1a", "name": "Kyoto Photos", "children": []},
                {"id": "F1b", "name": "Osaka", "children": [{"id": "F1b1", "name": "Night photos"}]}
             ]},
            {"id": "F2", "name": "Icons", "children": []},
            {"id": "F3", "name": null}
        ])
    }

    #[test]
    fn list_shows_top_level_folders() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_list", json!({})).unwrap();
        assert!(out.starts_with("Found 3 folders:"));
        assert!(out.contains("- Photos (ID: F1)"));
        assert!(out.contains("- Unnamed Folder (ID: F3)"));
        assert!(!out.contains("Kyoto"));
    }

    #[test]
    fn list_applies_the_limit() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_list", json!({"limit": 1})).unwrap();
        assert!(out.contains("- Photos (ID: F1)"));
        assert!(!out.contains("Icons"));
        assert!(out.contains("Showing first 1 of 3."));
    }

    #[test]
    fn empty_library_lists_zero_folders() {
        let api = MockApi::new().respond_data("/api/folder/list", json!([]));
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_list", json!({})).unwrap();
        assert_eq!(out, "Found 0 folders.\n");
    }

    #[test]
    fn search_walks_nested_folders_case_insensitively() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_search", json!({"keyword": "PHOTOS"}))
            .unwrap();
        assert!(out.starts_with("Found 3 folders matching 'PHOTOS':"));
        assert!(out.contains("Kyoto Photos (ID: F1a)"));
        assert!(out.contains("Night photos (ID: F1b1)"));
    }

    #[test]
    fn single_match_uses_the_singular_noun() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_search", json!({"keyword": "icon"}))
            .unwrap();
        assert!(out.starts_with("Found 1 folder matching 'icon':\n"));
        assert!(out.contains("- Icons (ID: F2)"));
    }

    #[test]
    fn search_without_matches_is_a_zero_result_report() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_search", json!({"keyword": "zzz"}))
            .unwrap();
        assert_eq!(out, "Found 0 folders matching 'zzz'.\n");
    }

    #[test]
    fn info_finds_nested_folder_and_samples_items() {
        let api = MockApi::new()
            .respond_data("/api/folder/list", tree())
            .respond_data(
                "/api/item/list",
                json!([{"name": "a.jpg"}, {"name": "b.jpg"}, {"name": null}]),
            );
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_info", json!({"folder_id": "F1b"}))
            .unwrap();
        assert!(out.contains("- Name: Osaka"));
        assert!(out.contains("- ID: F1b"));
        assert!(out.contains("- Items: 3"));
        assert!(out.contains("- Subfolders: 1"));
        assert!(out.contains("- Sample items: a.jpg, b.jpg, Unnamed Item"));
        assert!(!out.contains("Description"));

        let calls = api.calls();
        assert_eq!(calls[1].endpoint, "/api/item/list");
        assert_eq!(calls[1].payload, json!({"folders": "F1b", "limit": "10"}));
    }

    #[test]
    fn info_prefers_the_folder_item_count() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let out = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_info", json!({"folder_id": "F1"}))
            .unwrap();
        assert!(out.contains("- Items: 42"));
        assert!(out.contains("- Description: Travel shots"));
        assert!(!out.contains("Sample items"));
    }

    #[test]
    fn info_for_unknown_id_is_not_found() {
        let api = MockApi::new().respond_data("/api/folder/list", tree());
        let err = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_info", json!({"folder_id": "nope"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn create_reports_the_new_folder() {
        let api = MockApi::new().respond_data(
            "/api/folder/create",
            json!({"id": "NEW1", "name": "Refs", "modificationTime": 1_700_000_000_000i64}),
        );
        let out = run(
            &FolderHandler,
            &api,
            &BridgeConfig::default(),
            "folder_create",
            json!({"folder_name": "Refs", "parent_id": "F1"}),
        )
        .unwrap();
        assert!(out.contains("- ID: NEW1"));
        assert!(out.contains("- Parent ID: F1"));
        assert!(out.contains("- Creation Time: 2023-11-14 22:13:20 UTC"));
        assert_eq!(api.calls()[0].payload, json!({"folderName": "Refs", "parent": "F1"}));
    }

    #[test]
    fn update_needs_something_to_change() {
        let api = MockApi::new();
        let err = run(&FolderHandler, &api, &BridgeConfig::default(), "folder_update", json!({"folder_id": "F1"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NothingToUpdate);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn update_sends_only_supplied_fields() {
        let api = MockApi::new();
        let out = run(
            &FolderHandler,
            &api,
            &BridgeConfig::default(),
            "folder_update",
            json!({"folder_id": "F1", "description": "Old trips"}),
        )
        .unwrap();
        assert!(out.contains("- New Description: Old trips"));
        assert!(!out.contains("New Name"));
        let call = &api.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.payload, json!({"folderId": "F1", "newDescription": "Old trips"}));
    }

    #[test]
    fn rename_reports_id_and_name() {
        let api = MockApi::new();
        let out = run(
            &FolderHandler,
            &api,
            &BridgeConfig::default(),
            "folder_rename",
            json!({"folder_id": "F1", "new_name": "Archive"}),
        )
        .unwrap();
        assert!(out.contains("- Folder ID: F1\n"));
        assert!(out.contains("- New Name: Archive\n"));
        assert_eq!(api.calls()[0].endpoint, "/api/folder/update");
    }
}
