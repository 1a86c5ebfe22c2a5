//! Error types for the MCP Orchestrator

use std::io;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for the MCP Orchestrator
pub type Result<T> = std::result::Result<T, Error>;

/// MCP Orchestrator errors
///
/// The `Display` output of each variant is the `detail` string surfaced to
/// inbound callers, so the messages are part of the wire contract.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or incomplete caller input
    #[error("{0}")]
    BadRequest(String),

    /// Backend is not registered
    #[error("MCP server '{0}' not found")]
    BackendNotFound(String),

    /// Backend is registered but not enabled
    #[error("MCP server '{0}' is not enabled")]
    BackendDisabled(String),

    /// Backend did not respond within the timeout
    #[error("Backend timeout: {0}")]
    Timeout(String),

    /// Connection to the backend could not be established
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Backend returned a JSON-RPC error envelope
    #[error("Backend returned JSON-RPC error {code}: {message}")]
    Protocol {
        /// JSON-RPC error code
        code: i32,
        /// JSON-RPC error message
        message: String,
    },

    /// Backend response did not match the expected envelope shape
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code surfaced to the inbound caller
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BackendNotFound(_) => StatusCode::NOT_FOUND,
            Self::BackendDisabled(_) | Self::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            Error::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::BackendNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::BackendDisabled("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Unreachable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Timeout("x".into()).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            Error::Protocol {
                code: -32601,
                message: "Method not found".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::MalformedResponse("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn detail_strings_match_wire_contract() {
        assert_eq!(
            Error::BadRequest("Tool name required".into()).to_string(),
            "Tool name required"
        );
        assert_eq!(
            Error::BackendNotFound("github".into()).to_string(),
            "MCP server 'github' not found"
        );
        assert_eq!(
            Error::BackendDisabled("github".into()).to_string(),
            "MCP server 'github' is not enabled"
        );
    }

    #[test]
    fn protocol_error_includes_code_and_message() {
        let err = Error::Protocol {
            code: -32602,
            message: "Invalid params".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("-32602"));
        assert!(rendered.contains("Invalid params"));
    }
}
