// Eagle MCP Bridge - Image Media
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Local side of the image tools: decode the thumbnail path Eagle reports,
// derive the original file next to it, sniff the format, package as a
// base64 data URI.

use crate::error::ToolError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Classify by magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// Bytes win over the extension; unknown both ways is octet-stream
pub fn detect_mime(bytes: &[u8], path: &Path) -> &'static str {
    ImageFormat::sniff(bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .map(|f| f.mime())
        .unwrap_or("application/octet-stream")
}

/// Eagle returns thumbnail paths percent-encoded
pub fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// `<dir>/name_thumbnail.png` + `ext` -> `<dir>/name.<ext>`.
/// Eagle stores the original beside its thumbnail; thumbnails are always PNG,
/// so the extension comes from the item's `ext` field. Only the file name is
/// rewritten, never the directories.
pub fn original_path(thumbnail: &Path, ext: &str) -> PathBuf {
    let stem = thumbnail
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace("_thumbnail", "");
    let ext = ext.trim_start_matches('.');
    let file_name = if ext.is_empty() { stem } else { format!("{}.{}", stem, ext) };
    thumbnail.with_file_name(file_name)
}

/// A file packaged for a multimodal host
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub path: PathBuf,
    pub mime: &'static str,
    /// base64 payload without the data-URI prefix
    pub base64: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

pub fn encode_file(path: &Path) -> Result<EncodedImage, ToolError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            ToolError::Local(format!("image file not found: {}", path.display()))
        }
        _ => ToolError::Local(format!("cannot read {}: {}", path.display(), e)),
    })?;
    let mime = detect_mime(&bytes, path);
    log::debug!("encoded {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(EncodedImage {
        path: path.to_path_buf(),
        mime,
        base64: STANDARD.encode(&bytes),
    })
}

// ============================================================================
// TESTS
// ============================================================================
