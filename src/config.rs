// Eagle MCP Bridge - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Bridge settings: Eagle endpoint, timeout, pagination limits, passthrough gate.
// Built once in main.rs and handed to the dispatcher. No global instance.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value '{value}' for {var}: expected {expected}")]
    Env {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Eagle API base URL
    pub api_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub default_item_limit: u32,
    pub max_item_limit: u32,
    pub default_folder_limit: u32,
    pub max_folder_limit: u32,
    /// Registers the raw `api_*` passthrough group. Off unless asked for.
    pub expose_direct_api: bool,
    /// Maximum display length for names and other short text in reports
    pub display_max_len: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:41595".to_string(),
            timeout_secs: 30,
            default_item_limit: 50,
            max_item_limit: 500,
            default_folder_limit: 100,
            max_folder_limit: 1000,
            expose_direct_api: false,
            display_max_len: 50,
        }
    }
}

impl BridgeConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("Config not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable source. Unset variables keep the current value.
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EAGLE_API_URL") {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
        if let Some(v) = lookup("EAGLE_API_TIMEOUT") {
            self.timeout_secs = parse_timeout(&v)?;
        }
        if let Some(v) = lookup("DEFAULT_ITEM_LIMIT") {
            self.default_item_limit = parse_limit("DEFAULT_ITEM_LIMIT", &v)?;
        }
        if let Some(v) = lookup("MAX_ITEM_LIMIT") {
            self.max_item_limit = parse_limit("MAX_ITEM_LIMIT", &v)?;
        }
        if let Some(v) = lookup("DEFAULT_FOLDER_LIMIT") {
            self.default_folder_limit = parse_limit("DEFAULT_FOLDER_LIMIT", &v)?;
        }
        if let Some(v) = lookup("MAX_FOLDER_LIMIT") {
            self.max_folder_limit = parse_limit("MAX_FOLDER_LIMIT", &v)?;
        }
        if let Some(v) = lookup("EXPOSE_DIRECT_API_TOOLS") {
            self.expose_direct_api = parse_flag(&v)?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Effective item page size: requested clamped into 1..=max, default when absent
    pub fn item_limit(&self, requested: Option<i64>) -> u32 {
        clamp_limit(requested, self.default_item_limit, self.max_item_limit)
    }

    /// Effective folder page size: requested clamped into 1..=max, default when absent
    pub fn folder_limit(&self, requested: Option<i64>) -> u32 {
        clamp_limit(requested, self.default_folder_limit, self.max_folder_limit)
    }
}

fn clamp_limit(requested: Option<i64>, default: u32, max: u32) -> u32 {
    let max = max.max(1);
    match requested {
        Some(n) => n.clamp(1, max as i64) as u32,
        None => default.clamp(1, max),
    }
}

/// Timeouts are given in seconds; fractional values round up.
fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    let secs: f64 = value.trim().parse().map_err(|_| ConfigError::Env {
        var: "EAGLE_API_TIMEOUT",
        value: value.to_string(),
        expected: "a positive number of seconds",
    })?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::Env {
            var: "EAGLE_API_TIMEOUT",
            value: value.to_string(),
            expected: "a positive number of seconds",
        });
    }
    Ok(secs.ceil() as u64)
}

fn parse_limit(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Env {
            var,
            value: value.to_string(),
            expected: "a positive integer",
        }),
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var: "EXPOSE_DIRECT_API_TOOLS",
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================
