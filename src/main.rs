// Eagle MCP Bridge - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and MCP stdio server.
// Usage:
//   eagle-mcp-bridge serve                              # Run MCP server (stdio)
//   eagle-mcp-bridge tools                              # List registered tools
//   eagle-mcp-bridge call <tool> '<json arguments>'     # One-shot tool call
//   eagle-mcp-bridge health                             # Probe the Eagle API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eagle_mcp_bridge::{client::HttpConnector, config::BridgeConfig, dispatch::Dispatcher, mcp};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eagle-mcp-bridge")]
#[command(author = "Joseph Stone")]
#[command(version)]
#[command(about = "Eagle MCP Bridge - MCP tools for the Eagle asset library HTTP API")]
struct Cli {
    /// JSON config file (environment variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Eagle API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Register the raw api_* passthrough tools
    #[arg(long, global = true)]
    expose_direct_api: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server (stdio JSON-RPC)
    Serve,

    /// List registered tools
    Tools {
        /// Print full MCP definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one tool call and print the result text
    Call {
        /// Tool name (folder_list, item_search, ...)
        tool: String,

        /// Arguments as JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// Check that the Eagle API is reachable
    Health,
}

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
        None => BridgeConfig::default(),
    };
    let mut config = config.apply_env().context("Invalid environment configuration")?;

    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if cli.expose_direct_api {
        config.expose_direct_api = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    // stderr only: stdout is the JSON-RPC channel
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .try_init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let dispatcher = Dispatcher::new(config.clone(), Box::new(HttpConnector::new(config)));

    match &cli.command {
        Commands::Serve => {
            mcp::run(&dispatcher).context("MCP server I/O failed")?;
        }

        Commands::Tools { json } => {
            if *json {
                let tools: Vec<Value> = dispatcher.list_tools().iter().map(|t| t.to_mcp()).collect();
                println!("{}", serde_json::to_string_pretty(&tools)?);
            } else {
                for tool in dispatcher.list_tools() {
                    println!("{:<28} {}", tool.name, tool.description);
                }
            }
        }

        Commands::Call { tool, arguments } => {
            let arguments: Value = serde_json::from_str(arguments)
                .with_context(|| format!("Invalid arguments JSON: {}", arguments))?;

            let outcome = dispatcher.dispatch(tool, &arguments);
            print!("{}", outcome.text);

            if !outcome.ok {
                std::process::exit(1);
            }
        }

        Commands::Health => {
            let outcome = dispatcher.dispatch("health_check", &Value::Null);
            print!("{}", outcome.text);

            if !outcome.text.starts_with("Eagle API is healthy") {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
