// Eagle MCP Bridge - Handler Groups
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One handler per tool family. A handler declares its prefixes and tools and
// handles calls already routed and validated by the dispatcher. Handlers talk
// to Eagle only through CallContext, which owns translation and stage tracking.

pub mod admin;
pub mod direct_api;
pub mod folder;
pub mod image;
pub mod item;
pub mod library;

use crate::client::{success_data, RemoteApi};
use crate::config::BridgeConfig;
use crate::error::ToolError;
use crate::normalize::{Normalizer, Report};
use crate::schema::ToolDescriptor;
use crate::translate::{translate, WireRequest};
use crate::validate::Arguments;
use serde_json::Value;
use std::cell::Cell;
use std::fmt;

/// Invocation stages, strictly ordered. A failure is reported against the
/// last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    Validated,
    Translated,
    BaselineFetched,
    RemoteCalled,
    Normalized,
    Returned,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Received => "RECEIVED",
            Stage::Validated => "VALIDATED",
            Stage::Translated => "TRANSLATED",
            Stage::BaselineFetched => "BASELINE_FETCHED",
            Stage::RemoteCalled => "REMOTE_CALLED",
            Stage::Normalized => "NORMALIZED",
            Stage::Returned => "RETURNED",
        })
    }
}

/// Everything one invocation may touch. Lives exactly as long as the call.
pub struct CallContext<'a> {
    pub api: &'a dyn RemoteApi,
    pub config: &'a BridgeConfig,
    pub normalizer: Normalizer,
    stage: Cell<Stage>,
}

impl<'a> CallContext<'a> {
    pub fn new(api: &'a dyn RemoteApi, config: &'a BridgeConfig) -> Self {
        Self {
            api,
            config,
            normalizer: Normalizer::new(config.display_max_len),
            stage: Cell::new(Stage::Validated),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    /// Stages only move forward
    pub fn advance(&self, stage: Stage) {
        if stage > self.stage.get() {
            log::debug!("stage {} -> {}", self.stage.get(), stage);
            self.stage.set(stage);
        }
    }

    pub fn request(&self, operation: &str, args: &Arguments) -> Result<WireRequest, ToolError> {
        let request = translate(operation, args)?;
        self.advance(Stage::Translated);
        Ok(request)
    }

    /// Send a request and unwrap the success envelope
    pub fn send(&self, request: &WireRequest) -> Result<Value, ToolError> {
        let response = self.api.send(request)?;
        let data = success_data(&request.endpoint, response)?;
        self.advance(Stage::RemoteCalled);
        Ok(data)
    }

    /// Translate and send in one step
    pub fn call(&self, operation: &str, args: &Arguments) -> Result<Value, ToolError> {
        let request = self.request(operation, args)?;
        self.send(&request)
    }

    /// Read the current state an update is computed against
    pub fn baseline(&self, operation: &str, args: &Arguments) -> Result<Value, ToolError> {
        let request = translate(operation, args)?;
        self.advance(Stage::Translated);
        let response = self.api.send(&request)?;
        let data = success_data(&request.endpoint, response)?;
        self.advance(Stage::BaselineFetched);
        Ok(data)
    }
}

/// A tool family
pub trait ToolHandler: Send + Sync {
    /// Routing keys owned by this group: a name prefix up to and including
    /// the first '_'.
    fn prefixes(&self) -> &'static [&'static str];

    /// Descriptors in declaration order
    fn tools(&self) -> Vec<ToolDescriptor>;

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError>;

    /// Report for a call whose session could not be opened. `None` fails it.
    fn without_session(&self, _name: &str, _error: &ToolError, _config: &BridgeConfig) -> Option<Report> {
        None
    }
}

/// Handler groups in catalog order
pub fn default_handlers(config: &BridgeConfig) -> Vec<Box<dyn ToolHandler>> {
    let mut handlers: Vec<Box<dyn ToolHandler>> = vec![
        Box::new(folder::FolderHandler),
        Box::new(item::ItemHandler),
        Box::new(library::LibraryHandler),
        Box::new(image::ImageHandler),
    ];
    if config.expose_direct_api {
        handlers.push(Box::new(direct_api::DirectApiHandler));
    }
    handlers.push(Box::new(admin::AdminHandler));
    handlers
}

/// Entities as a list. Eagle answers `data: null` or `data: {}` for empty
/// results on some versions; both count as zero entities.
pub(crate) fn entities(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    }
}

/// Text of a string-valued field, for matching rather than display
pub(crate) fn raw_str<'v>(entity: &'v Value, key: &str) -> Option<&'v str> {
    entity.get(key).and_then(Value::as_str)
}

/// "Found N <noun> matching '<keyword>'" listing for keyword searches
pub(crate) fn matches_listing(
    count: usize,
    singular: &str,
    plural: &str,
    keyword: &str,
    ctx: &CallContext<'_>,
) -> Report {
    let shown = ctx.normalizer.text_or(Some(&Value::from(keyword)), "");
    Report::listing(
        count,
        &format!("{} matching '{}'", singular, shown),
        &format!("{} matching '{}'", plural, shown),
    )
}

pub(crate) fn not_found_unless_object(data: Value, entity: &str, id: &str) -> Result<Value, ToolError> {
    if data.is_object() {
        Ok(data)
    } else {
        Err(ToolError::not_found(entity, id))
    }
}


// ============================================================================
// TESTS
// ============================================================================
