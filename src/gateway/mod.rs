//! Gateway core and HTTP surface

mod auth;
mod orchestrator;
mod router;
mod server;

pub use auth::{ResolvedAuthConfig, auth_middleware};
pub use orchestrator::{AllTools, ExecutionResult, Orchestrator, ToolCallRequest};
pub use router::{AppState, create_router};
pub use server::Gateway;
