//! JSON-RPC protocol client for backend MCP servers
//!
//! Performs exactly one network round trip per call and translates the
//! backend's response envelope into a typed result. Failure translation is
//! uniform: request timeout, connection failure, JSON-RPC error envelope,
//! and undecodable body each map to a distinct error variant. No retries —
//! resilience, if any, belongs to a higher layer.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::config::RpcConfig;
use crate::protocol::{
    JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    RequestId, Tool, ToolsCallParams, ToolsListResult,
};
use crate::{Error, Result};

/// JSON-RPC client for backend MCP servers
pub struct RpcClient {
    /// HTTP client (shared connection pool)
    http: Client,
    /// Request ID counter; ids are process-local, one outstanding request
    /// per call
    next_id: AtomicI64,
    /// Timeouts
    config: RpcConfig,
}

impl RpcClient {
    /// Create a new client
    ///
    /// Timeouts are applied per request, not on the client builder, so one
    /// client serves both invocation and listing calls.
    pub fn new(config: RpcConfig) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            next_id: AtomicI64::new(1),
            config,
        })
    }

    /// Perform one JSON-RPC call against a backend
    ///
    /// Returns the envelope's `result` value on success.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if no response arrives within `timeout`
    /// - [`Error::Unreachable`] if a connection cannot be established or the
    ///   backend answers with a non-success HTTP status
    /// - [`Error::Protocol`] if the envelope carries a JSON-RPC error
    /// - [`Error::MalformedResponse`] if the body is not a valid envelope
    pub async fn call(
        &self,
        base_url: &Url,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let endpoint = rpc_endpoint(base_url);
        let request = JsonRpcRequest::new(self.next_id(), method, params);

        debug!(url = %endpoint, method = %method, id = %request.id, "Sending JSON-RPC request");

        let response = self
            .http
            .post(endpoint.clone())
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_send_error(&endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Unreachable(format!(
                "{endpoint} returned HTTP {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_send_error(&endpoint, &e))?;

        let envelope: JsonRpcResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        if envelope.jsonrpc != JSONRPC_VERSION {
            return Err(Error::MalformedResponse(format!(
                "unexpected jsonrpc version '{}'",
                envelope.jsonrpc
            )));
        }

        if let Some(error) = envelope.error {
            return Err(Error::Protocol {
                code: error.code,
                message: error.message,
            });
        }

        envelope.result.ok_or_else(|| {
            Error::MalformedResponse("response carries neither result nor error".to_string())
        })
    }

    /// List the tools a backend exposes (`tools/list`)
    pub async fn list_tools(&self, base_url: &Url) -> Result<Vec<Tool>> {
        let result = self
            .call(base_url, METHOD_TOOLS_LIST, None, self.config.list_timeout)
            .await?;

        let list: ToolsListResult = serde_json::from_value(result)
            .map_err(|e| Error::MalformedResponse(format!("invalid tools/list result: {e}")))?;

        Ok(list.tools)
    }

    /// Invoke a named tool with arguments (`tools/call`)
    ///
    /// Returns the raw `result` value of the response envelope.
    pub async fn invoke_tool(
        &self,
        base_url: &Url,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value> {
        let params = serde_json::to_value(ToolsCallParams {
            name: tool.to_string(),
            arguments: Value::Object(arguments),
        })
        .map_err(|e| Error::Internal(format!("Failed to encode call params: {e}")))?;

        self.call(
            base_url,
            METHOD_TOOLS_CALL,
            Some(params),
            self.config.invoke_timeout,
        )
        .await
    }

    /// Next request ID
    fn next_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// The RPC endpoint lives at `/mcp` under the backend's base URL
fn rpc_endpoint(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    let path = format!("{}/mcp", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}

/// Map a reqwest send/read failure onto the error taxonomy
fn classify_send_error(endpoint: &Url, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout(endpoint.to_string())
    } else {
        Error::Unreachable(format!("{endpoint}: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_mcp_path() {
        let base = Url::parse("http://github-mcp:8000").unwrap();
        assert_eq!(rpc_endpoint(&base).as_str(), "http://github-mcp:8000/mcp");

        let with_slash = Url::parse("http://github-mcp:8000/").unwrap();
        assert_eq!(
            rpc_endpoint(&with_slash).as_str(),
            "http://github-mcp:8000/mcp"
        );

        let with_path = Url::parse("http://gateway.internal/backends/github").unwrap();
        assert_eq!(
            rpc_endpoint(&with_path).as_str(),
            "http://gateway.internal/backends/github/mcp"
        );
    }
}
