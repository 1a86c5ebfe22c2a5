//! Bearer-token authentication middleware
//!
//! Optional: when disabled every request passes through. Token verification
//! against an identity provider happens upstream; the gateway only compares
//! the presented bearer token against its configured value. Public paths
//! (default `/health`) bypass authentication entirely.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::AuthConfig;

/// Resolved authentication configuration (token env references expanded)
#[derive(Debug)]
pub struct ResolvedAuthConfig {
    /// Whether auth is enabled
    pub enabled: bool,
    /// Resolved bearer token
    pub bearer_token: Option<String>,
    /// Paths that bypass authentication
    pub public_paths: Vec<String>,
}

impl ResolvedAuthConfig {
    /// Create resolved config from `AuthConfig`
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            enabled: config.enabled,
            bearer_token: config.resolve_bearer_token(),
            public_paths: config.public_paths.clone(),
        }
    }

    /// Check if a path is public (bypasses auth)
    #[must_use]
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.starts_with(p))
    }

    /// Validate a presented token
    #[must_use]
    pub fn validate_token(&self, token: &str) -> bool {
        self.bearer_token.as_deref() == Some(token)
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(auth_config): State<Arc<ResolvedAuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth_config.enabled {
        return next.run(request).await;
    }

    let path = request.uri().path();

    if auth_config.is_public_path(path) {
        debug!(path = %path, "Public path, skipping auth");
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        });

    let Some(token) = token else {
        warn!(path = %path, "Missing Authorization header");
        return unauthorized_response(
            "Missing Authorization header. Use: Authorization: Bearer <token>",
        );
    };

    if auth_config.validate_token(token) {
        next.run(request).await
    } else {
        warn!(path = %path, "Invalid token");
        unauthorized_response("Invalid token")
    }
}

/// Create a 401 Unauthorized response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [("WWW-Authenticate", "Bearer")],
        Json(json!({ "detail": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_path_check() {
        let config = ResolvedAuthConfig {
            enabled: true,
            bearer_token: Some("test".to_string()),
            public_paths: vec!["/health".to_string()],
        };

        assert!(config.is_public_path("/health"));
        assert!(config.is_public_path("/health/"));
        assert!(!config.is_public_path("/execute"));
        assert!(!config.is_public_path("/"));
    }

    #[test]
    fn bearer_token_validation() {
        let config = ResolvedAuthConfig {
            enabled: true,
            bearer_token: Some("secret123".to_string()),
            public_paths: vec![],
        };

        assert!(config.validate_token("secret123"));
        assert!(!config.validate_token("wrong"));
        assert!(!config.validate_token(""));
    }

    #[test]
    fn no_configured_token_rejects_everything() {
        let config = ResolvedAuthConfig {
            enabled: true,
            bearer_token: None,
            public_paths: vec![],
        };

        assert!(!config.validate_token("anything"));
    }
}
