//! MCP prompt handlers

use super::types::*;
use crate::error::{ApiError, ApiResult};
use axum::{response::IntoResponse, Json};
use curator_knowledge::{
    KNOWLEDGE_CAPTURE_GUIDANCE, KNOWLEDGE_CAPTURE_PROMPT, KNOWLEDGE_CAPTURE_PROMPT_DESCRIPTION,
};

/// POST /mcp/prompts/list - List available prompts
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/mcp/prompts/list",
    tag = "MCP",
    responses(
        (status = 200, description = "Available prompts", body = ListPromptsResponse),
    ),
))]
pub async fn list_prompts() -> impl IntoResponse {
    Json(ListPromptsResponse {
        prompts: available_prompts(),
        next_cursor: None,
    })
}

/// POST /mcp/prompts/get - Get a prompt
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/mcp/prompts/get",
    tag = "MCP",
    request_body = GetPromptRequest,
    responses(
        (status = 200, description = "Prompt messages", body = GetPromptResponse),
        (status = 404, description = "Prompt not found", body = ApiError),
    ),
))]
pub async fn get_prompt(Json(req): Json<GetPromptRequest>) -> ApiResult<Json<GetPromptResponse>> {
    render_prompt(&req.name).map(Json)
}

fn available_prompts() -> Vec<Prompt> {
    vec![Prompt {
        name: KNOWLEDGE_CAPTURE_PROMPT.to_string(),
        description: Some(KNOWLEDGE_CAPTURE_PROMPT_DESCRIPTION.to_string()),
        arguments: None,
    }]
}

fn render_prompt(name: &str) -> ApiResult<GetPromptResponse> {
    match name {
        KNOWLEDGE_CAPTURE_PROMPT => Ok(GetPromptResponse {
            description: Some(KNOWLEDGE_CAPTURE_PROMPT_DESCRIPTION.to_string()),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: PromptContent::Text {
                    text: KNOWLEDGE_CAPTURE_GUIDANCE.to_string(),
                },
            }],
        }),
        other => Err(ApiError::not_found(format!("unknown prompt: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_capture_guidance_is_listed() {
        let prompts = available_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, "knowledge_capture_guidance");
    }

    #[test]
    fn test_render_capture_guidance() {
        let response = render_prompt(KNOWLEDGE_CAPTURE_PROMPT).unwrap();
        let PromptContent::Text { text } = &response.messages[0].content;
        assert!(text.contains("capture_insight"));
    }

    #[test]
    fn test_unknown_prompt_is_not_found() {
        let err = render_prompt("summarize").unwrap_err();
        assert_eq!(err.code, ErrorCode::EntityNotFound);
    }
}
