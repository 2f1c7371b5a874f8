//! Model Context Protocol (MCP) routes
//!
//! Exposes the knowledge engine's tools and the capture guidance prompt
//! over plain HTTP POST endpoints.

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod handlers;
pub mod prompts;
pub mod types;

pub use handlers::*;
pub use prompts::*;
pub use types::*;

/// Create the MCP router with all endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/mcp/info", get(|| async { SERVER_NAME }))
        .route("/mcp/initialize", post(initialize))
        .route("/mcp/tools/list", post(list_tools))
        .route("/mcp/tools/call", post(call_tool))
        .route("/mcp/prompts/list", post(list_prompts))
        .route("/mcp/prompts/get", post(get_prompt))
}
