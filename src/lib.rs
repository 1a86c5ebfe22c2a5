//! MCP Orchestrator Library
//!
//! Thin HTTP gateway that routes tool execution requests to backend MCP
//! servers speaking JSON-RPC 2.0, with TTL-bounded response caching and
//! optional bearer-token authentication.
//!
//! # Architecture
//!
//! - [`registry`]: immutable backend registry built from configuration
//! - [`client`]: JSON-RPC protocol client (one round trip per call, no retries)
//! - [`cache`]: concurrent TTL response cache
//! - [`gateway`]: orchestrator core and the axum HTTP surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod registry;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
