//! Router/orchestrator - the single entry point for tool execution
//!
//! Resolves an inbound request to a backend (explicit name or inferred from
//! the tool name prefix), enforces enablement, consults the cache, invokes
//! the protocol client on miss, and caches successful results. Failures are
//! never cached and never swallowed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::client::RpcClient;
use crate::config::CacheConfig;
use crate::protocol::Tool;
use crate::registry::{BackendDescriptor, BackendRegistry};
use crate::{Error, Result};

/// Inbound tool execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool name
    pub tool: String,
    /// Target backend; inferred from the tool name prefix when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Result of a successful tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Always true; failures surface as error responses instead
    pub success: bool,
    /// Backend that served the call
    pub server: String,
    /// Tool that was invoked
    pub tool: String,
    /// Raw result value returned by the backend
    pub result: Value,
    /// Echo of the input arguments
    pub arguments: Map<String, Value>,
}

/// Fan-out listing over all enabled backends
///
/// Per-backend failures land in `errors` without disturbing the results of
/// the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllTools {
    /// Tools per backend that answered successfully
    pub tools: HashMap<String, Vec<Tool>>,
    /// Failure detail per backend that did not
    pub errors: HashMap<String, String>,
}

/// Orchestrator owning the registry, cache and protocol client
pub struct Orchestrator {
    /// Backend registry
    registry: Arc<BackendRegistry>,
    /// Response cache
    cache: Arc<ResponseCache>,
    /// Protocol client
    client: Arc<RpcClient>,
    /// TTL for cached executions
    execute_ttl: Duration,
    /// TTL for cached tool listings
    tools_ttl: Duration,
}

impl Orchestrator {
    /// Create an orchestrator over injected collaborators
    #[must_use]
    pub fn new(
        registry: Arc<BackendRegistry>,
        cache: Arc<ResponseCache>,
        client: Arc<RpcClient>,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            client,
            execute_ttl: cache_config.execute_ttl,
            tools_ttl: cache_config.tools_ttl,
        }
    }

    /// Execute a tool on a backend MCP server
    ///
    /// # Errors
    ///
    /// - [`Error::BadRequest`] for an empty tool name or an unresolvable
    ///   backend
    /// - [`Error::BackendNotFound`] / [`Error::BackendDisabled`] per the
    ///   registry
    /// - any protocol client failure, propagated untouched
    pub async fn execute(&self, request: ToolCallRequest) -> Result<ExecutionResult> {
        if request.tool.is_empty() {
            return Err(Error::BadRequest("Tool name required".to_string()));
        }

        let server = match request.server {
            Some(ref name) => name.clone(),
            None => self
                .registry
                .infer_backend(&request.tool)
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::BadRequest(
                        "Server name required or tool name must include server prefix".to_string(),
                    )
                })?,
        };

        let backend = self.resolve_enabled(&server)?;

        let key = ResponseCache::execute_key(&server, &request.tool);
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(execution) = serde_json::from_value::<ExecutionResult>(cached) {
                debug!(server = %server, tool = %request.tool, "Serving execution from cache");
                return Ok(execution);
            }
        }

        let result = self
            .client
            .invoke_tool(&backend.url, &request.tool, request.arguments.clone())
            .await?;

        let execution = ExecutionResult {
            success: true,
            server: backend.name.clone(),
            tool: request.tool,
            result,
            arguments: request.arguments,
        };

        if let Ok(value) = serde_json::to_value(&execution) {
            self.cache.put(&key, value, self.execute_ttl);
        }

        info!(server = %execution.server, tool = %execution.tool, "Tool executed");

        Ok(execution)
    }

    /// List the tools of one backend, served from cache when fresh
    pub async fn list_tools(&self, server: &str) -> Result<Vec<Tool>> {
        let backend = self.resolve_enabled(server)?;

        let key = ResponseCache::tools_key(server);
        if let Some(cached) = self.cache.get(&key) {
            if let Ok(tools) = serde_json::from_value::<Vec<Tool>>(cached) {
                debug!(server = %server, "Serving tool listing from cache");
                return Ok(tools);
            }
        }

        let tools = self.client.list_tools(&backend.url).await?;

        if let Ok(value) = serde_json::to_value(&tools) {
            self.cache.put(&key, value, self.tools_ttl);
        }

        debug!(server = %server, count = tools.len(), "Tool listing fetched");

        Ok(tools)
    }

    /// List the tools of every enabled backend concurrently
    ///
    /// Each backend call is governed by its own timeout; one backend's
    /// failure does not cancel or affect another's outcome.
    pub async fn list_all_tools(&self) -> AllTools {
        let names: Vec<String> = self
            .registry
            .all()
            .filter(|b| b.enabled)
            .map(|b| b.name.clone())
            .collect();

        let listings = future::join_all(
            names
                .into_iter()
                .map(|name| async move { (name.clone(), self.list_tools(&name).await) }),
        )
        .await;

        let mut all = AllTools::default();
        for (name, outcome) in listings {
            match outcome {
                Ok(tools) => {
                    all.tools.insert(name, tools);
                }
                Err(e) => {
                    warn!(server = %name, error = %e, "Tool listing failed");
                    all.errors.insert(name, e.to_string());
                }
            }
        }
        all
    }

    /// Resolve a backend by name and enforce enablement
    fn resolve_enabled(&self, server: &str) -> Result<&BackendDescriptor> {
        let backend = self
            .registry
            .get(server)
            .ok_or_else(|| Error::BackendNotFound(server.to_string()))?;

        if !backend.enabled {
            return Err(Error::BackendDisabled(server.to_string()));
        }

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn orchestrator(backends: Vec<BackendDescriptor>) -> Orchestrator {
        let cache_config = CacheConfig::default();
        Orchestrator::new(
            Arc::new(BackendRegistry::new(backends)),
            Arc::new(ResponseCache::new(&cache_config)),
            Arc::new(RpcClient::new(crate::config::RpcConfig::default()).unwrap()),
            &cache_config,
        )
    }

    fn descriptor(name: &str, enabled: bool) -> BackendDescriptor {
        BackendDescriptor {
            name: name.to_string(),
            // Reserved port; never contacted in these tests
            url: Url::parse("http://127.0.0.1:9").unwrap(),
            enabled,
        }
    }

    fn request(tool: &str, server: Option<&str>) -> ToolCallRequest {
        ToolCallRequest {
            tool: tool.to_string(),
            server: server.map(str::to_string),
            arguments: Map::new(),
        }
    }

    #[tokio::test]
    async fn empty_tool_name_is_bad_request() {
        let orchestrator = orchestrator(vec![descriptor("github", true)]);

        let err = orchestrator.execute(request("", None)).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(err.to_string(), "Tool name required");

        // Regardless of other fields
        let err = orchestrator
            .execute(request("", Some("github")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn unresolvable_server_is_bad_request() {
        let orchestrator = orchestrator(vec![descriptor("github", true)]);

        let err = orchestrator
            .execute(request("jira_create_ticket", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "Server name required or tool name must include server prefix"
        );
    }

    #[tokio::test]
    async fn unknown_backend_is_not_found() {
        let orchestrator = orchestrator(vec![descriptor("github", true)]);

        let err = orchestrator
            .execute(request("list_repos", Some("gitlab")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BackendNotFound(_)));
        assert_eq!(err.to_string(), "MCP server 'gitlab' not found");
    }

    #[tokio::test]
    async fn disabled_backend_rejected_before_any_network_call() {
        // The descriptor URL points at a reserved port; reaching the network
        // would fail with Unreachable, so BackendDisabled proves the check
        // fires first.
        let orchestrator = orchestrator(vec![descriptor("github", false)]);

        let err = orchestrator
            .execute(request("github_list_repos", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BackendDisabled(_)));
        assert_eq!(err.to_string(), "MCP server 'github' is not enabled");

        let err = orchestrator.list_tools("github").await.unwrap_err();
        assert!(matches!(err, Error::BackendDisabled(_)));
    }

    #[tokio::test]
    async fn list_all_tools_skips_disabled_backends() {
        let orchestrator = orchestrator(vec![descriptor("github", false)]);

        let all = orchestrator.list_all_tools().await;
        assert!(all.tools.is_empty());
        assert!(all.errors.is_empty());
    }
}
