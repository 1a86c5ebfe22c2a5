//! Configuration management

use std::{collections::HashMap, env, path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Response cache configuration
    pub cache: CacheConfig,
    /// Outbound RPC client configuration
    pub rpc: RpcConfig,
    /// Backend configurations keyed by backend name
    pub backends: HashMap<String, BackendConfig>,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (MCP_ORCHESTRATOR_ prefix)
        figment = figment.merge(Env::prefixed("MCP_ORCHESTRATOR_").split("__"));

        let config: Self = figment.extract().map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }

    /// Get enabled backends only
    pub fn enabled_backends(&self) -> impl Iterator<Item = (&String, &BackendConfig)> {
        self.backends.iter().filter(|(_, b)| b.is_enabled())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Authentication configuration for gateway access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable authentication (default: false)
    pub enabled: bool,

    /// Bearer token for simple authentication.
    /// Supports a literal value or `env:VAR_NAME`.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Paths that bypass authentication (default: `["/health"]`)
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bearer_token: None,
            public_paths: default_public_paths(),
        }
    }
}

impl AuthConfig {
    /// Resolve the bearer token (expand `env:VAR_NAME` references)
    #[must_use]
    pub fn resolve_bearer_token(&self) -> Option<String> {
        self.bearer_token.as_ref().map(|token| {
            if let Some(var_name) = token.strip_prefix("env:") {
                env::var(var_name).unwrap_or_else(|_| token.clone())
            } else {
                token.clone()
            }
        })
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable response caching. When disabled the cache is always-miss.
    pub enabled: bool,
    /// TTL for cached tool executions
    #[serde(with = "humantime_serde")]
    pub execute_ttl: Duration,
    /// TTL for cached tool listings
    #[serde(with = "humantime_serde")]
    pub tools_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            execute_ttl: Duration::from_secs(300),
            tools_ttl: Duration::from_secs(600),
        }
    }
}

/// Outbound RPC client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Timeout for tool invocations
    #[serde(with = "humantime_serde")]
    pub invoke_timeout: Duration,
    /// Timeout for tool listings and other auxiliary lookups
    #[serde(with = "humantime_serde")]
    pub list_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            invoke_timeout: Duration::from_secs(30),
            list_timeout: Duration::from_secs(10),
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend MCP server
    pub url: String,
    /// Explicit enablement flag. Takes precedence over `token_env`.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Credential environment variable; the backend is enabled only if this
    /// variable is set and non-empty. Ignored when `enabled` is explicit.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl BackendConfig {
    /// Whether this backend is enabled, resolving `token_env` if needed
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.resolve_enabled(|var| env::var(var).ok())
    }

    /// Enablement resolution against an arbitrary variable lookup
    fn resolve_enabled(&self, lookup: impl Fn(&str) -> Option<String>) -> bool {
        if let Some(enabled) = self.enabled {
            return enabled;
        }
        match &self.token_env {
            Some(var) => lookup(var).is_some_and(|v| !v.is_empty()),
            None => true,
        }
    }
}
