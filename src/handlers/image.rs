// Eagle MCP Bridge - Image Tools
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// image_get_base64, image_get_filepath, image_analyze_prompt,
// thumbnail_get_base64. Eagle only hands out file paths; the bytes are read
// from the local library, so these tools only work on the machine running Eagle.

use super::{not_found_unless_object, CallContext, ToolHandler};
use crate::error::ToolError;
use crate::media::{decode_path, encode_file, original_path, EncodedImage};
use crate::normalize::Report;
use crate::schema::{ParamSpec, ToolDescriptor};
use crate::validate::Arguments;
use serde_json::{json, Value};
use std::path::PathBuf;

const DEFAULT_PROMPT: &str = "Describe this image in detail";

pub struct ImageHandler;

impl ToolHandler for ImageHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["image_", "thumbnail_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("image_get_base64", "Get image as Base64 encoded data for LLM analysis")
                .param(ParamSpec::string("item_id", "The ID of the item to get image data").required())
                .param(
                    ParamSpec::boolean("use_thumbnail", "Use thumbnail instead of full image (faster, smaller)")
                        .default_value(json!(true)),
                ),
            ToolDescriptor::new("image_get_filepath", "Get image file paths for LLM analysis")
                .param(ParamSpec::string("item_id", "The ID of the item to get file path").required()),
            ToolDescriptor::new("image_analyze_prompt", "Prepare image for LLM analysis with custom prompt")
                .param(ParamSpec::string("item_id", "The ID of the item to analyze").required())
                .param(
                    ParamSpec::string("analysis_prompt", "Custom prompt for image analysis")
                        .default_value(json!(DEFAULT_PROMPT)),
                )
                .param(
                    ParamSpec::boolean("use_thumbnail", "Use thumbnail for faster analysis")
                        .default_value(json!(true)),
                ),
            ToolDescriptor::new("thumbnail_get_base64", "Get thumbnail image as Base64 for quick preview")
                .param(ParamSpec::string("item_id", "The ID of the item to get thumbnail").required()),
        ]
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        match name {
            "image_get_base64" => get_base64(args, ctx),
            "image_get_filepath" => get_filepath(args, ctx),
            "image_analyze_prompt" => analyze_prompt(args, ctx),
            "thumbnail_get_base64" => thumbnail_base64(args, ctx),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }
}

/// Item record plus its decoded thumbnail path
struct Located {
    item: Value,
    thumbnail: PathBuf,
}

impl Located {
    fn original(&self) -> PathBuf {
        let ext = self.item.get("ext").and_then(Value::as_str).unwrap_or("jpg");
        original_path(&self.thumbnail, ext)
    }
}

fn thumbnail_path(item_id: &str, ctx: &CallContext<'_>) -> Result<PathBuf, ToolError> {
    let data = ctx.call("item_thumbnail", &Arguments::new().with("item_id", json!(item_id)))?;
    match data.as_str().filter(|s| !s.is_empty()) {
        Some(raw) => Ok(PathBuf::from(decode_path(raw))),
        None => Err(ToolError::not_found("thumbnail for item", item_id)),
    }
}

fn locate(operation: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Located, ToolError> {
    let item_id = args.require_str("item_id")?;
    let item = not_found_unless_object(ctx.call(operation, args)?, "item", item_id)?;
    let thumbnail = thumbnail_path(item_id, ctx)?;
    Ok(Located { item, thumbnail })
}

fn encode_located(located: &Located, use_thumbnail: bool) -> Result<EncodedImage, ToolError> {
    if use_thumbnail {
        encode_file(&located.thumbnail)
    } else {
        encode_file(&located.original())
    }
}

fn base64_report(
    item_id: &str,
    located: &Located,
    image: &EncodedImage,
    use_thumbnail: bool,
    ctx: &CallContext<'_>,
) -> Report {
    let n = &ctx.normalizer;
    let mut report = Report::new(format!(
        "Image Base64 Data for {}:",
        n.text_or(located.item.get("name"), "Unnamed Image")
    ));
    report
        .blank()
        .value("Item ID", item_id)
        .value("File Type", n.text_or(located.item.get("ext"), "unknown"))
        .value("MIME Type", image.mime)
        .value("Source", if use_thumbnail { "Thumbnail" } else { "Full Image" })
        .value("Image Path", image.path.display())
        .blank()
        .text(format!("Base64 Data (length: {} chars):", image.base64.len()))
        .text(image.data_uri());
    report
}

fn get_base64(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let use_thumbnail = args.bool("use_thumbnail").unwrap_or(true);
    let located = locate("image_get_base64", args, ctx)?;
    let image = encode_located(&located, use_thumbnail)?;
    Ok(base64_report(item_id, &located, &image, use_thumbnail, ctx))
}

fn get_filepath(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let located = locate("image_get_filepath", args, ctx)?;
    let original = located.original();
    let yes_no = |exists: bool| if exists { "Yes" } else { "No" };

    let n = &ctx.normalizer;
    let item = &located.item;
    let dimensions = match (
        item.get("width").and_then(Value::as_u64),
        item.get("height").and_then(Value::as_u64),
    ) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
        _ => None,
    };

    let mut report = Report::new(format!(
        "Image File Paths for {}:",
        n.text_or(item.get("name"), "Unnamed Image")
    ));
    report
        .blank()
        .value("Item ID", item_id)
        .value("Full Image", original.display())
        .value("File Exists", yes_no(original.exists()))
        .value("Thumbnail", located.thumbnail.display())
        .value("Thumbnail Exists", yes_no(located.thumbnail.exists()))
        .value("File Size", format!("{} bytes", item.get("size").and_then(Value::as_u64).unwrap_or(0)))
        .field("Dimensions", dimensions);
    Ok(report)
}

fn analyze_prompt(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let prompt = args.str("analysis_prompt").unwrap_or(DEFAULT_PROMPT);
    let use_thumbnail = args.bool("use_thumbnail").unwrap_or(true);
    let located = locate("image_analyze_prompt", args, ctx)?;
    let image = encode_located(&located, use_thumbnail)?;

    let n = &ctx.normalizer;
    let item = &located.item;
    let name = n.text_or(item.get("name"), "Unnamed Image");
    let mut report = Report::new(format!("Image Analysis Setup for {}:", name));
    report
        .blank()
        .text(format!("Analysis Prompt: {}", prompt))
        .blank()
        .text("Image Context:")
        .value("Item ID", item_id)
        .value("Name", &name)
        .value("Type", n.text_or(item.get("ext"), "unknown"))
        .field("Current Tags", n.full(item.get("tags")).filter(|t| !t.is_empty()))
        .field("Annotation", n.text(item.get("annotation")).filter(|a| !a.is_empty()))
        .blank()
        .text(base64_report(item_id, &located, &image, use_thumbnail, ctx).render().trim_end());
    Ok(report)
}

fn thumbnail_base64(args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
    let item_id = args.require_str("item_id")?;
    let thumbnail = thumbnail_path(item_id, ctx)?;
    let image = encode_file(&thumbnail)?;

    let mut report = Report::new(format!("Thumbnail Base64 Data for Item {}:", item_id));
    report
        .blank()
        .value("Thumbnail Path", thumbnail.display())
        .value("MIME Type", image.mime)
        .value("Data Length", format!("{} characters", image.base64.len()))
        .blank()
        .text(image.data_uri());
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
    use std::path::Path;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

    /// An Eagle-like item folder with a thumbnail and its original
    fn library(dir: &Path) -> PathBuf {
        let info = dir.join("K1 item.info");
        std::fs::create_dir_all(&info).unwrap();
        std::fs::write(info.join("sunset_thumbnail.png"), PNG).unwrap();
        std::fs::write(info.join("sunset.jpg"), JPEG).unwrap();
        info.join("sunset_thumbnail.png")
    }

    fn api_for(thumbnail: &Path) -> MockApi {
        let encoded = urlencoding::encode(&thumbnail.display().to_string()).into_owned();
        MockApi::new()
            .respond_data(
                "/api/item/info",
                json!({"id": "I1", "name": "sunset", "ext": "jpg", "size": 4,
                       "width": 10, "height": 5, "tags": ["sky", "sea"]}),
            )
            .respond_data("/api/item/thumbnail", json!(encoded))
    }

    #[test]
    fn base64_defaults_to_the_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let api = api_for(&library(dir.path()));
        let out = run(&ImageHandler, &api, &BridgeConfig::default(), "image_get_base64", json!({"item_id": "I1"}))
            .unwrap();
        assert!(out.starts_with("Image Base64 Data for sunset:"));
        assert!(out.contains("- MIME Type: image/png\n"));
        assert!(out.contains("- Source: Thumbnail\n"));
        assert!(out.contains("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn base64_of_the_full_image_uses_the_item_extension() {
        let dir = tempfile::tempdir().unwrap();
        let api = api_for(&library(dir.path()));
        let out = run(
            &ImageHandler,
            &api,
            &BridgeConfig::default(),
            "image_get_base64",
            json!({"item_id": "I1", "use_thumbnail": false}),
        )
        .unwrap();
        assert!(out.contains("- Source: Full Image\n"));
        assert!(out.contains("sunset.jpg\n"));
        assert!(out.contains("data:image/jpeg;base64,/9j/4A=="));
    }

    #[test]
    fn filepath_reports_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let thumb = library(dir.path());
        let api = api_for(&thumb);
        let out = run(&ImageHandler, &api, &BridgeConfig::default(), "image_get_filepath", json!({"item_id": "I1"}))
            .unwrap();
        assert!(out.contains(&format!("- Thumbnail: {}\n", thumb.display())));
        assert!(out.contains("- File Exists: Yes\n"));
        assert!(out.contains("- Thumbnail Exists: Yes\n"));
        assert!(out.contains("- Dimensions: 10x5\n"));
    }

    #[test]
    fn analyze_prompt_wraps_the_image_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let api = api_for(&library(dir.path()));
        let out = run(&ImageHandler, &api, &BridgeConfig::default(), "image_analyze_prompt", json!({"item_id": "I1"}))
            .unwrap();
        assert!(out.contains("Analysis Prompt: Describe this image in detail\n"));
        assert!(out.contains("- Current Tags: sky, sea\n"));
        assert!(out.contains("Image Base64 Data for sunset:"));
    }

    #[test]
    fn thumbnail_only_needs_the_thumbnail_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let api = api_for(&library(dir.path()));
        let out = run(&ImageHandler, &api, &BridgeConfig::default(), "thumbnail_get_base64", json!({"item_id": "I1"}))
            .unwrap();
        assert!(out.starts_with("Thumbnail Base64 Data for Item I1:"));
        assert!(out.contains("- Data Length: 12 characters\n"));
        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, "/api/item/thumbnail");
    }

    #[test]
    fn missing_file_is_a_local_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = api_for(&dir.path().join("gone_thumbnail.png"));
        let err = run(&ImageHandler, &api, &BridgeConfig::default(), "thumbnail_get_base64", json!({"item_id": "I1"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Local);
    }

    #[test]
    fn empty_thumbnail_path_is_not_found() {
        let api = MockApi::new().respond_data("/api/item/thumbnail", json!(""));
        let err = run(&ImageHandler, &api, &BridgeConfig::default(), "thumbnail_get_base64", json!({"item_id": "I1"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
