// Eagle MCP Bridge - MCP Server (JSON-RPC 2.0 over stdio)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One JSON message per line on stdin, one response per line on stdout.
// stdout carries JSON-RPC only; all logging goes to stderr.

use crate::dispatch::{Dispatcher, ToolCall};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "eagle-mcp-bridge";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC method not found
const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC invalid params
const INVALID_PARAMS: i64 = -32602;

fn response(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Write one message as a single line
fn send<W: Write>(out: &mut W, message: &Value) -> io::Result<()> {
    let line = serde_json::to_string(message)?;
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Answer one inbound message. Notifications get no answer.
pub fn handle_message(dispatcher: &Dispatcher, msg: &Value) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = &msg["id"];
    let params = &msg["params"];

    log::debug!("received: {}", method);

    match method {
        "initialize" => Some(response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION,
                }
            }),
        )),

        "notifications/initialized" => None,

        "tools/list" => {
            let tools: Vec<Value> = dispatcher.list_tools().iter().map(|t| t.to_mcp()).collect();
            Some(response(id, json!({ "tools": tools })))
        }

        "tools/call" => {
            let Some(call) = ToolCall::from_params(params) else {
                return Some(error_response(id, INVALID_PARAMS, "tools/call requires a tool name"));
            };
            let outcome = dispatcher.dispatch_call(&call);
            Some(response(
                id,
                json!({
                    "content": [{ "type": "text", "text": outcome.text }],
                    "isError": !outcome.ok,
                }),
            ))
        }

        "ping" => Some(response(id, json!({}))),

        _ => {
            if id.is_null() {
                None
            } else {
                Some(error_response(id, METHOD_NOT_FOUND, &format!("Unknown method: {}", method)))
            }
        }
    }
}

/// Serve until the input closes
pub fn serve<R: BufRead, W: Write>(dispatcher: &Dispatcher, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin read error: {}", e);
                continue;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("JSON parse error: {}", e);
                continue;
            }
        };

        if let Some(reply) = handle_message(dispatcher, &msg) {
            send(&mut output, &reply)?;
        }
    }
    Ok(())
}

pub fn run(dispatcher: &Dispatcher) -> io::Result<()> {
    log::info!("Starting {} v{}", SERVER_NAME, SERVER_VERSION);
    log::info!("Eagle API: {}", dispatcher.config().api_url);
    log::info!("{} tools registered", dispatcher.list_tools().len());

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(dispatcher, stdin.lock(), stdout.lock())
}

// ============================================================================
// TESTS
// ============================================================================
