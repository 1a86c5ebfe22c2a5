//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// MCP Orchestrator - route tool execution to backend MCP servers
#[derive(Parser, Debug)]
#[command(name = "mcp-orchestrator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "MCP_ORCHESTRATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MCP_ORCHESTRATOR_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "MCP_ORCHESTRATOR_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_ORCHESTRATOR_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "MCP_ORCHESTRATOR_LOG_FORMAT")]
    pub log_format: Option<String>,
}
