// Eagle MCP Bridge - Dispatcher
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Routes (tool, arguments) to the handler owning the name prefix and runs
//   RECEIVED -> VALIDATED -> TRANSLATED -> (BASELINE_FETCHED) -> REMOTE_CALLED
//   -> NORMALIZED -> RETURNED
// No stage is retried. Any failure ends the call with one text naming the
// error kind and the last stage reached; nothing escapes as a panic or a
// partial report.
//
// The remote session is opened after validation, so caller-input errors
// never touch the network, and dropped on every exit path.

use crate::client::Connector;
use crate::config::BridgeConfig;
use crate::error::{ErrorKind, ToolError};
use crate::handlers::{default_handlers, CallContext, Stage, ToolHandler};
use crate::schema::ToolDescriptor;
use crate::validate::{validate, Arguments};
use serde_json::Value;
use std::collections::HashMap;

/// Marker every failure text starts with
pub const FAILURE_MARKER: &str = "ERROR";

/// One inbound invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    /// From MCP `tools/call` params: `{name, arguments?}`
    pub fn from_params(params: &Value) -> Option<Self> {
        let name = params.get("name")?.as_str()?.to_string();
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        Some(Self { name, arguments })
    }
}

/// Uniform result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub ok: bool,
    pub text: String,
    pub error: Option<ErrorKind>,
}

impl ToolOutcome {
    fn success(text: String) -> Self {
        Self { ok: true, text, error: None }
    }

    fn failure(error: &ToolError, stage: Stage) -> Self {
        Self {
            ok: false,
            text: format!("{} [{}] at {}: {}", FAILURE_MARKER, error.kind(), stage, error),
            error: Some(error.kind()),
        }
    }
}

/// Name prefix up to and including the first '_'
pub fn routing_key(name: &str) -> Option<&str> {
    name.find('_').map(|i| &name[..=i])
}

pub struct Dispatcher {
    config: BridgeConfig,
    connector: Box<dyn Connector>,
    handlers: Vec<Box<dyn ToolHandler>>,
    /// routing key -> handler index
    routes: HashMap<&'static str, usize>,
    /// Descriptors in registration order
    catalog: Vec<ToolDescriptor>,
    /// tool name -> (catalog index, handler index)
    tools: HashMap<&'static str, (usize, usize)>,
}

impl Dispatcher {
    /// Dispatcher with the standard handler groups for this configuration
    pub fn new(config: BridgeConfig, connector: Box<dyn Connector>) -> Self {
        let handlers = default_handlers(&config);
        Self::with_handlers(config, connector, handlers)
    }

    pub fn with_handlers(
        config: BridgeConfig,
        connector: Box<dyn Connector>,
        handlers: Vec<Box<dyn ToolHandler>>,
    ) -> Self {
        let mut dispatcher = Self {
            config,
            connector,
            handlers: Vec::new(),
            routes: HashMap::new(),
            catalog: Vec::new(),
            tools: HashMap::new(),
        };
        for handler in handlers {
            dispatcher.register(handler);
        }
        log::debug!(
            "registered {} tools across {} handler groups",
            dispatcher.catalog.len(),
            dispatcher.handlers.len()
        );
        dispatcher
    }

    /// Add a handler group. A prefix already owned by another group stays
    /// with its first owner; tools routed elsewhere are not registered.
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        let index = self.handlers.len();
        for &prefix in handler.prefixes() {
            if let Some(owner) = self.routes.get(prefix) {
                log::warn!("prefix '{}' already owned by handler #{}, ignoring", prefix, owner);
                continue;
            }
            self.routes.insert(prefix, index);
        }
        for tool in handler.tools() {
            let routed_here = routing_key(tool.name).and_then(|k| self.routes.get(k)) == Some(&index);
            if !routed_here || self.tools.contains_key(tool.name) {
                log::warn!("tool '{}' is not routable to its handler, skipping", tool.name);
                continue;
            }
            self.tools.insert(tool.name, (self.catalog.len(), index));
            self.catalog.push(tool);
        }
        self.handlers.push(handler);
    }

    /// Full catalog, grouped by handler in registration order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn dispatch_call(&self, call: &ToolCall) -> ToolOutcome {
        self.dispatch(&call.name, &call.arguments)
    }

    /// Run one invocation. Never panics, never returns a partial report.
    pub fn dispatch(&self, name: &str, arguments: &Value) -> ToolOutcome {
        log::info!("tool call: {}", name);
        match self.run(name, arguments) {
            Ok(text) => {
                log::debug!("{} returned {} bytes", name, text.len());
                ToolOutcome::success(text)
            }
            Err((error, stage)) => {
                if error.is_caller_input() {
                    log::info!("{} rejected at {}: {}", name, stage, error);
                } else {
                    log::warn!("{} failed at {}: {}", name, stage, error);
                }
                ToolOutcome::failure(&error, stage)
            }
        }
    }

    fn run(&self, name: &str, arguments: &Value) -> Result<String, (ToolError, Stage)> {
        let at = |stage: Stage| move |e: ToolError| (e, stage);

        let (handler, descriptor) = self.route(name).map_err(at(Stage::Received))?;
        let args = validate(descriptor, &Arguments::from_value(arguments))
            .into_arguments()
            .map_err(at(Stage::Received))?;
        log::debug!("{}: stage {}", name, Stage::Validated);

        let session = match self.connector.open() {
            Ok(session) => session,
            Err(error) => {
                return match handler.without_session(name, &error, &self.config) {
                    Some(report) => Ok(report.render()),
                    None => Err((error, Stage::Validated)),
                };
            }
        };
        let ctx = CallContext::new(session.as_ref(), &self.config);
        let report = handler.handle(name, &args, &ctx).map_err(|e| (e, ctx.stage()))?;
        ctx.advance(Stage::Normalized);
        let text = report.render();
        ctx.advance(Stage::Returned);
        Ok(text)
    }

    fn route(&self, name: &str) -> Result<(&dyn ToolHandler, &ToolDescriptor), ToolError> {
        let key = routing_key(name).ok_or_else(|| ToolError::unknown_tool(name))?;
        let handler_index = match self.routes.get(key) {
            Some(&index) => index,
            None if key == "api_" && !self.config.expose_direct_api => {
                return Err(ToolError::UnknownTool {
                    name: name.to_string(),
                    hint: Some("passthrough tools are disabled; set EXPOSE_DIRECT_API_TOOLS=true".to_string()),
                });
            }
            None => return Err(ToolError::unknown_tool(name)),
        };
        let (catalog_index, owner) = self
            .tools
            .get(name)
            .copied()
            .ok_or_else(|| ToolError::unknown_tool(name))?;
        match (self.handlers.get(owner), self.catalog.get(catalog_index)) {
            (Some(handler), Some(descriptor)) if owner == handler_index => Ok((handler.as_ref(), descriptor)),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
