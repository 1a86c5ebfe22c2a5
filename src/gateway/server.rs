//! Gateway server

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::auth::ResolvedAuthConfig;
use super::orchestrator::Orchestrator;
use super::router::{AppState, create_router};
use crate::cache::ResponseCache;
use crate::client::RpcClient;
use crate::config::Config;
use crate::registry::BackendRegistry;
use crate::{Error, Result};

/// MCP Orchestrator server
pub struct Gateway {
    /// Configuration
    config: Config,
    /// Backend registry
    registry: Arc<BackendRegistry>,
}

impl Gateway {
    /// Create a new gateway
    pub fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(BackendRegistry::from_config(&config)?);

        for backend in registry.all() {
            info!(
                backend = %backend.name,
                url = %backend.url,
                enabled = backend.enabled,
                "Registered backend"
            );
        }

        Ok(Self { config, registry })
    }

    /// Run the gateway
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let cache = Arc::new(ResponseCache::new(&self.config.cache));
        let client = Arc::new(RpcClient::new(self.config.rpc.clone())?);
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&self.registry),
            cache,
            client,
            &self.config.cache,
        ));
        let auth_config = Arc::new(ResolvedAuthConfig::from_config(&self.config.auth));

        let state = Arc::new(AppState {
            orchestrator,
            registry: Arc::clone(&self.registry),
            auth_config: Arc::clone(&auth_config),
        });

        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        info!(host = %self.config.server.host, port = self.config.server.port, "Listening");
        info!(
            backends = self.registry.all().count(),
            enabled = self.registry.all().filter(|b| b.enabled).count(),
            "Backends registered"
        );

        if auth_config.enabled {
            info!("AUTHENTICATION enabled (bearer token)");
        } else {
            warn!("AUTHENTICATION disabled - gateway is open to all requests");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("Gateway shutdown complete");

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
