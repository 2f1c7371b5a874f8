//! MCP handler functions

use super::types::*;
use crate::error::{ApiError, ApiResult};
use crate::extractors::ActorExtractor;
use axum::{extract::State, response::IntoResponse, Json};
use curator_knowledge::KnowledgeEngine;

pub const SERVER_NAME: &str = "Curator MCP Server";

/// POST /mcp/initialize - Open an MCP session
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/mcp/initialize",
    tag = "MCP",
    request_body = InitializeRequest,
    responses(
        (status = 200, description = "Server capabilities", body = InitializeResponse),
    ),
))]
pub async fn initialize(
    ActorExtractor(actor): ActorExtractor,
    Json(req): Json<InitializeRequest>,
) -> impl IntoResponse {
    tracing::info!(
        client_name = %req.client_info.name,
        client_version = %req.client_info.version,
        protocol_version = %req.protocol_version,
        session_id = %actor.session_id,
        "MCP session initialized"
    );

    Json(InitializeResponse {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability { list_changed: false },
            prompts: PromptsCapability { list_changed: false },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

/// POST /mcp/tools/list - List available tools
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/mcp/tools/list",
    tag = "MCP",
    responses(
        (status = 200, description = "List of available tools", body = ListToolsResponse),
    ),
))]
pub async fn list_tools(State(engine): State<KnowledgeEngine>) -> impl IntoResponse {
    let tools: Vec<Tool> = engine
        .tool_definitions()
        .into_iter()
        .map(Tool::from)
        .collect();
    tracing::debug!(count = tools.len(), "MCP list_tools");
    Json(ListToolsResponse { tools })
}

/// POST /mcp/tools/call - Execute a tool
///
/// Engine failures come back as a 200 with `is_error: true` and the
/// `{"error": ...}` payload as text. Only an unknown tool name is an HTTP
/// error.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/mcp/tools/call",
    tag = "MCP",
    request_body = CallToolRequest,
    responses(
        (status = 200, description = "Tool execution result", body = CallToolResponse),
        (status = 404, description = "Tool not found", body = ApiError),
    ),
))]
pub async fn call_tool(
    State(engine): State<KnowledgeEngine>,
    ActorExtractor(actor): ActorExtractor,
    Json(req): Json<CallToolRequest>,
) -> ApiResult<Json<CallToolResponse>> {
    tracing::debug!(tool = %req.name, user_id = %actor.user_id, "MCP tool call");

    let output = engine
        .call_tool(&req.name, req.arguments, &actor)
        .await
        .ok_or_else(|| ApiError::not_found(format!("unknown tool: {}", req.name)))?;

    if output.is_error {
        tracing::debug!(tool = %req.name, payload = %output.payload, "Tool returned an error");
    }

    Ok(Json(CallToolResponse {
        content: vec![ContentBlock::Text {
            text: output.to_text(),
        }],
        is_error: output.is_error,
    }))
}
