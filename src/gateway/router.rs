//! HTTP router and handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};

use super::auth::{ResolvedAuthConfig, auth_middleware};
use super::orchestrator::{ExecutionResult, Orchestrator, ToolCallRequest};
use crate::Result;
use crate::registry::BackendRegistry;

/// Shared application state
pub struct AppState {
    /// Orchestrator core
    pub orchestrator: Arc<Orchestrator>,
    /// Backend registry (for the read-only listing endpoints)
    pub registry: Arc<BackendRegistry>,
    /// Authentication configuration
    pub auth_config: Arc<ResolvedAuthConfig>,
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_config = Arc::clone(&state.auth_config);

    Router::new()
        .route("/health", get(health_handler))
        .route("/execute", post(execute_handler))
        .route("/servers", get(list_servers_handler))
        .route("/servers/{name}/tools", get(server_tools_handler))
        .route("/tools", get(all_tools_handler))
        .layer(middleware::from_fn_with_state(auth_config, auth_middleware))
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let servers: HashMap<&str, &str> = state
        .registry
        .all()
        .map(|b| (b.name.as_str(), if b.enabled { "enabled" } else { "disabled" }))
        .collect();

    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "servers": servers,
    }))
}

/// POST /execute - run a tool on a backend MCP server
async fn execute_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<ExecutionResult>> {
    state.orchestrator.execute(request).await.map(Json)
}

/// GET /servers - list registered backends
async fn list_servers_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let servers: HashMap<&str, Value> = state
        .registry
        .all()
        .map(|b| {
            (
                b.name.as_str(),
                json!({ "enabled": b.enabled, "url": b.url.as_str() }),
            )
        })
        .collect();

    Json(json!({ "servers": servers }))
}

/// GET /servers/{name}/tools - list one backend's tools
async fn server_tools_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>> {
    let tools = state.orchestrator.list_tools(&name).await?;
    Ok(Json(json!({ "server": name, "tools": tools })))
}

/// GET /tools - list every enabled backend's tools, isolating failures
async fn all_tools_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.orchestrator.list_all_tools().await)
}
