//! Backend registry
//!
//! Immutable mapping from backend name to descriptor, built once at startup
//! from configuration. Also owns the tool-name-prefix inference rule used
//! when a caller omits the server name.

use std::collections::HashMap;

use url::Url;

use crate::config::Config;
use crate::{Error, Result};

/// A registered backend MCP server
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    /// Backend name (unique, stable key)
    pub name: String,
    /// Base URL of the backend
    pub url: Url,
    /// Whether the backend may receive requests
    pub enabled: bool,
}

/// Backend registry - immutable after construction
#[derive(Debug)]
pub struct BackendRegistry {
    /// Backends by name
    backends: HashMap<String, BackendDescriptor>,
}

impl BackendRegistry {
    /// Create a registry from a set of descriptors
    #[must_use]
    pub fn new(backends: impl IntoIterator<Item = BackendDescriptor>) -> Self {
        Self {
            backends: backends.into_iter().map(|b| (b.name.clone(), b)).collect(),
        }
    }

    /// Build the registry from configuration, resolving each backend's
    /// enablement and validating its URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a backend URL does not parse.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut backends = Vec::with_capacity(config.backends.len());
        for (name, backend) in &config.backends {
            let url = Url::parse(&backend.url).map_err(|e| {
                Error::Config(format!("Invalid URL for backend '{name}': {e}"))
            })?;
            backends.push(BackendDescriptor {
                name: name.clone(),
                url,
                enabled: backend.is_enabled(),
            });
        }
        Ok(Self::new(backends))
    }

    /// Look up a backend by exact, case-sensitive name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BackendDescriptor> {
        self.backends.get(name)
    }

    /// All registered backends
    pub fn all(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.backends.values()
    }

    /// Infer the backend from a tool name prefix
    ///
    /// A tool name `github_list_repos` infers backend `github`: the match is
    /// a registered backend name followed by an underscore. When multiple
    /// backend names prefix the tool, the longest match wins.
    #[must_use]
    pub fn infer_backend(&self, tool_name: &str) -> Option<&str> {
        self.backends
            .keys()
            .filter(|name| {
                tool_name
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.starts_with('_'))
            })
            .max_by_key(|name| name.len())
            .map(String::as_str)
    }
}
