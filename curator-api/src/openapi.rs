//! OpenAPI Specification for the Curator API
//!
//! Generated with utoipa from the route annotations and the wire types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::admin::{
    self, ChangesetListResponse, InsightListResponse, RollbackResponse, UpdateStatusRequest,
};
use crate::routes::health::{self, ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::mcp::{
    self, CallToolRequest, CallToolResponse, ContentBlock, GetPromptRequest, GetPromptResponse,
    InitializeRequest, InitializeResponse, ListPromptsResponse, ListToolsResponse, Prompt,
    PromptMessage, Tool,
};

use curator_core::{
    ActionType, ApplyChange, Category, Changeset, Confidence, Insight, InsightEditInput,
    InsightStats, InsightStatus, RelatedColumn, Source, SuggestedAction,
};

/// OpenAPI document for the Curator API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Curator API",
        version = "0.4.0",
        description = "Knowledge gateway between AI assistants and a DataHub metadata catalog: insight capture, admin review, audited catalog writes with rollback.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "MCP", description = "Model Context Protocol tools and prompts"),
        (name = "Insights", description = "Review queue of captured insights"),
        (name = "Changesets", description = "Audit trail of catalog writes and rollback"),
        (name = "Health", description = "Liveness and readiness")
    ),
    paths(
        // === MCP ===
        mcp::initialize,
        mcp::list_tools,
        mcp::call_tool,
        mcp::list_prompts,
        mcp::get_prompt,

        // === Admin ===
        admin::list_insights,
        admin::insight_stats,
        admin::get_insight,
        admin::update_insight_status,
        admin::edit_insight,
        admin::list_changesets,
        admin::get_changeset,
        admin::rollback_changeset,

        // === Health ===
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,
            // Domain
            Insight,
            InsightStatus,
            Category,
            Confidence,
            Source,
            ActionType,
            RelatedColumn,
            SuggestedAction,
            ApplyChange,
            Changeset,
            InsightStats,
            InsightEditInput,
            // Admin
            InsightListResponse,
            ChangesetListResponse,
            UpdateStatusRequest,
            RollbackResponse,
            // MCP
            InitializeRequest,
            InitializeResponse,
            Tool,
            ListToolsResponse,
            CallToolRequest,
            CallToolResponse,
            ContentBlock,
            Prompt,
            ListPromptsResponse,
            GetPromptRequest,
            GetPromptResponse,
            PromptMessage,
            // Health
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Pretty-printed JSON document.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
