// Eagle MCP Bridge - Item Tools
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// item_search, item_info, item_move_to_folder, item_update_tags, item_rename,
// item_update_metadata, item_delete. Deletion moves to Eagle's trash.

use super::{entities, matches_listing, not_found_unless_object, CallContext, ToolHandler};
use crate::error::ToolError;
use crate::normalize::Report;
use crate::resolve::{resolve_intent, UpdateIntent, UpdateMode, MODES};
use crate::schema::{ParamSpec, ToolDescriptor};
use crate::validate::Arguments;
use serde_json::{json, Value};

pub struct ItemHandler;

impl ToolHandler for ItemHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["item_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("item_search", "Search items by keyword")
                .param(ParamSpec::string("keyword", "Search keyword").required())
                .param(ParamSpec::integer("limit", "Maximum number of items to return")),
            ToolDescriptor::new("item_info", "Get detailed information about an item")
                .param(ParamSpec::string("item_id", "The ID of the item").required()),
            ToolDescriptor::new("item_move_to_folder", "Move an item to a folder")
                .param(ParamSpec::string("item_id", "The ID of the item to move").required())
                .param(ParamSpec::string("folder_id", "The ID of the destination folder").required()),
            ToolDescriptor::new("item_update_tags", "Replace, add or remove item tags")
                .param(ParamSpec::string("item_id", "The ID of the item").required())
                .param(ParamSpec::array("tags", "Tags to apply").required())
                .param(
                    ParamSpec::one_of("mode", MODES, "How to update tags (replace, add, or remove)")
                        .default_value(json!("replace")),
                ),
            ToolDescriptor::new("item_rename", "Rename an item")
                .param(ParamSpec::string("item_id", "The ID of the item to rename").required())
                .param(ParamSpec::string("new_name", "New name for the item").required()),
            ToolDescriptor::new("item_update_metadata", "Update item annotation and star rating")
                .param(ParamSpec::string("item_id", "The ID of the item").required())
                .param(ParamSpec::string("annotation", "New annotation for the item"))
                .param(ParamSpec::integer("star", "Star rating (0-5)").range(0, 5)),
            ToolDescriptor::new("item_delete", "Move an item to the Eagle trash")
                .param(ParamSpec::string("item_id", "The ID of the item to delete").required()),
        ]
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        match name {
            "item_search" => search(args, ctx),
            "item_info" => info(args, ctx),
            "item_move_to_folder" => move_to_folder(args, ctx),
            "item_update_tags" => update_tags(args, ctx),
            "item_rename" => rename(args, ctx),
            "item_update_metadata" => update_metadata(args, ctx),
            "item_delete" => delete(args, ctx),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }
}

/// Tags of an item record; anything that is not a string list reads as empty
fn tags_of(item: &Value) -> Vec<String> {
    item.get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn search(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let keyword = args.require_str("keyword")?;
    let limit = ctx.config.item_limit(args.i64("limit"));
    let data = ctx.call("item_search", &args.clone().with("limit", json!(limit)))?;
    let items = entities(&data);

    let n = &ctx.normalizer;
    let mut report = matches_listing(items.len(), "item", "items", keyword, ctx);
    for item in items {
        report
            .entry(format!(
                "{} ({})",
                n.text_or(item.get("name"), "Unnamed Item"),
                n.text_or(item.get("ext"), "unknown")
            ))
            .detail("ID", Some(n.full_or(item.get("id"), "Unknown")))
            .detail("Tags", n.full(item.get("tags")).filter(|t| !t.is_empty()))
            .blank();
    }
    Ok(report)
}

fn info(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let item = not_found_unless_object(ctx.call("item_info", args)?, "item", item_id)?;

    let n = &ctx.normalizer;
    let dimensions = match (
        item.get("width").and_then(Value::as_u64),
        item.get("height").and_then(Value::as_u64),
    ) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
        _ => None,
    };
    let star = item.get("star").and_then(Value::as_i64).filter(|s| *s > 0);

    let mut report = Report::new("Item Information:");
    report
        .value("Name", n.text_or(item.get("name"), "Unnamed Item"))
        .value("ID", n.full_or(item.get("id"), item_id))
        .value("Type", n.text_or(item.get("ext"), "unknown"))
        .value("Size", format!("{} bytes", item.get("size").and_then(Value::as_u64).unwrap_or(0)))
        .field("Dimensions", dimensions)
        .field("Tags", n.full(item.get("tags")).filter(|t| !t.is_empty()))
        .field("Annotation", n.text(item.get("annotation")).filter(|a| !a.is_empty()))
        .field("Rating", star.map(|s| format!("{} stars", s)))
        .field("URL", n.full(item.get("url")).filter(|u| !u.is_empty()))
        .field("Modified", n.timestamp(item.get("modificationTime")));
    Ok(report)
}

fn move_to_folder(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let folder_id = args.require_str("folder_id")?;
    ctx.call("item_move_to_folder", args)?;

    let mut report = Report::new("Item moved successfully:");
    report.value("Item ID", item_id).value("Destination Folder ID", folder_id);
    Ok(report)
}

fn update_tags(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let mode: UpdateMode = args.str("mode").unwrap_or("replace").parse()?;
    let intent = UpdateIntent {
        target_id: item_id.to_string(),
        field: "tags",
        mode,
        values: args.strings("tags").unwrap_or_default(),
    };

    let resolved = resolve_intent(&intent, |id| {
        let item = ctx.baseline("item_info", &Arguments::new().with("item_id", json!(id)))?;
        let item = not_found_unless_object(item, "item", id)?;
        Ok(tags_of(&item))
    })?;

    let final_args = args.clone().with("tags", json!(resolved));
    ctx.call("item_update_tags", &final_args)?;

    let new_tags = ctx
        .normalizer
        .full(final_args.get("tags"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "(none)".to_string());
    let mut report = Report::new("Item tags updated successfully:");
    report
        .value("Item ID", item_id)
        .value("Mode", mode)
        .value("New Tags", new_tags);
    Ok(report)
}

fn rename(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let new_name = args.require_str("new_name")?;
    ctx.call("item_rename", args)?;

    let mut report = Report::new("Item renamed successfully:");
    report.value("Item ID", item_id).value("New Name", new_name);
    Ok(report)
}

fn update_metadata(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    if !args.has("annotation") && !args.has("star") {
        return Err(ToolError::NothingToUpdate(vec![
            "annotation".to_string(),
            "star".to_string(),
        ]));
    }
    ctx.call("item_update_metadata", args)?;

    let mut report = Report::new("Item metadata updated successfully:");
    report
        .value("Item ID", item_id)
        .field("New Annotation", ctx.normalizer.full(args.get("annotation")))
        .field("New Rating", args.i64("star").map(|s| format!("{} stars", s)));
    Ok(report)
}

fn delete(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    ctx.call("item_delete", args)?;

    let mut report = Report::new("Item moved to trash successfully:");
    report
        .value("Item ID", item_id)
        .value("Status", "Moved to trash (can be restored from Eagle's trash)");
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

    fn item(tags: Value) -> Value {
        json!({"id": "I1", "name": "sunset", "ext": "jpg", "size": 2048,
               "width": 640, "height": 480, "tags": tags, "star": 4,
               "annotation": "golden hour"})
    }

    #[test]
    fn search_uses_the_configured_default_limit() {
        let api = MockApi::new().respond_data("/api/item/list", json!([item(json!(["sky"]))]));
        let config = BridgeConfig { default_item_limit: 7, ..Default::default() };
        let out = run(&ItemHandler, &api, &config, "item_search", json!({"keyword": "sun"})).unwrap();
        assert!(out.starts_with("Found 1 item matching 'sun':"));
        assert!(out.contains("- sunset (jpg)\n  ID: I1\n  Tags: sky\n"));
        assert_eq!(api.calls()[0].payload, json!({"keyword": "sun", "limit": "7"}));
    }

    #[test]
    fn search_clamps_oversized_limits() {
        let api = MockApi::new().respond_data("/api/item/list", json!([]));
        let out = run(&ItemHandler, &api, &BridgeConfig::default(), "item_search", json!({"keyword": "x", "limit": 99999}))
            .unwrap();
        assert_eq!(out, "Found 0 items matching 'x'.\n");
        assert_eq!(api.calls()[0].payload["limit"], "500");
    }

    #[test]
    fn info_renders_present_fields_only() {
        let api = MockApi::new().respond_data("/api/item/info", item(json!([])));
        let out = run(&ItemHandler, &api, &BridgeConfig::default(), "item_info", json!({"item_id": "I1"})).unwrap();
        assert!(out.contains("- Name: sunset\n"));
        assert!(out.contains("- Size: 2048 bytes\n"));
        assert!(out.contains("- Dimensions: 640x480\n"));
        assert!(out.contains("- Rating: 4 stars\n"));
        assert!(out.contains("- Annotation: golden hour\n"));
        assert!(!out.contains("Tags"));
        assert!(!out.contains("URL"));
    }

    #[test]
    fn info_on_null_data_is_not_found() {
        let api = MockApi::new();
        let err = run(&ItemHandler, &api, &BridgeConfig::default(), "item_info", json!({"item_id": "ghost"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn move_wraps_the_folder_id() {
        let api = MockApi::new();
        run(&ItemHandler, &api, &BridgeConfig::default(), "item_move_to_folder", json!({"item_id": "I1", "folder_id": "F2"}))
            .unwrap();
        assert_eq!(api.calls()[0].payload, json!({"id": "I1", "folders": ["F2"]}));
    }

    #[test]
    fn add_tags_merges_with_the_baseline() {
        let api = MockApi::new().respond_data("/api/item/info", item(json!(["a", "b"])));
        let out = run(
            &ItemHandler,
            &api,
            &BridgeConfig::default(),
            "item_update_tags",
            json!({"item_id": "I1", "tags": ["b", "c"], "mode": "add"}),
        )
        .unwrap();
        assert!(out.contains("- Mode: add\n"));
        assert!(out.contains("- New Tags: a, b, c\n"));

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, Method::Get);
        assert_eq!(calls[1].endpoint, "/api/item/update");
        assert_eq!(calls[1].payload, json!({"id": "I1", "tags": ["a", "b", "c"]}));
    }

    #[test]
    fn remove_tags_drops_all_occurrences() {
        let api = MockApi::new().respond_data("/api/item/info", item(json!(["a", "b", "a"])));
        run(
            &ItemHandler,
            &api,
            &BridgeConfig::default(),
            "item_update_tags",
            json!({"item_id": "I1", "tags": ["a"], "mode": "remove"}),
        )
        .unwrap();
        assert_eq!(api.calls()[1].payload["tags"], json!(["b"]));
    }

    #[test]
    fn replace_tags_skips_the_baseline() {
        let api = MockApi::new();
        let out = run(&ItemHandler, &api, &BridgeConfig::default(), "item_update_tags", json!({"item_id": "I1", "tags": []}))
            .unwrap();
        assert!(out.contains("- New Tags: (none)"));
        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload, json!({"id": "I1", "tags": []}));
    }

    #[test]
    fn failed_baseline_means_no_write() {
        let api = MockApi::new().fail("/api/item/info", ToolError::RemoteUnavailable("timed out".into()));
        let err = run(
            &ItemHandler,
            &api,
            &BridgeConfig::default(),
            "item_update_tags",
            json!({"item_id": "I1", "tags": ["x"], "mode": "add"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn invalid_mode_never_reaches_the_network() {
        let api = MockApi::new();
        let err = run(
            &ItemHandler,
            &api,
            &BridgeConfig::default(),
            "item_update_tags",
            json!({"item_id": "I1", "tags": ["x"], "mode": "merge"}),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMode);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn metadata_requires_a_field_and_checks_star_range() {
        let api = MockApi::new();
        let config = BridgeConfig::default();
        let err = run(&ItemHandler, &api, &config, "item_update_metadata", json!({"item_id": "I1"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NothingToUpdate);

        let err = run(&ItemHandler, &api, &config, "item_update_metadata", json!({"item_id": "I1", "star": 9}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
        assert!(api.calls().is_empty());

        let out = run(&ItemHandler, &api, &config, "item_update_metadata", json!({"item_id": "I1", "star": "3"}))
            .unwrap();
        assert!(out.contains("- New Rating: 3 stars"));
        assert_eq!(api.calls()[0].payload, json!({"id": "I1", "star": 3}));
    }

    #[test]
    fn delete_moves_to_trash() {
        let api = MockApi::new();
        let out = run(&ItemHandler, &api, &BridgeConfig::default(), "item_delete", json!({"item_id": "I1"})).unwrap();
        assert!(out.contains("can be restored"));
        assert_eq!(api.calls()[0].endpoint, "/api/item/moveToTrash");
        assert_eq!(api.calls()[0].payload, json!({"itemIds": ["I1"]}));
    }
}
