//! MCP endpoints exercised in-process through the full router.

mod support;

use axum::http::StatusCode;
use curator_core::{InsightStatus, KnowledgeConfig};
use curator_storage::InsightStore;
use curator_test_utils::fixtures::*;
use curator_test_utils::CatalogWrite;
use serde_json::json;
use support::TestApp;

#[tokio::test]
async fn initialize_advertises_tools_and_prompts() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/mcp/initialize",
            &analyst(),
            json!({
                "protocol_version": "2024-11-05",
                "capabilities": {},
                "client_info": {"name": "desktop-assistant", "version": "1.2.0"}
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["protocol_version"], "2024-11-05");
    assert!(body["capabilities"]["tools"].is_object());
    assert!(body["capabilities"]["prompts"].is_object());
    assert!(body["capabilities"].get("resources").is_none());
    assert_eq!(body["server_info"]["name"], "Curator MCP Server");
}

#[tokio::test]
async fn info_is_plain_text() {
    let app = TestApp::new();
    let (status, body) = app.get("/mcp/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Curator MCP Server"));
}

#[tokio::test]
async fn tools_list_follows_apply_switch() {
    let app = TestApp::new();
    let (_, body) = app.post("/mcp/tools/list", &analyst(), json!({})).await;
    let names: Vec<_> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["capture_insight", "apply_knowledge"]);
    assert!(body["tools"][0]["input_schema"]["properties"]["category"].is_object());

    let disabled = TestApp::with_config(KnowledgeConfig {
        apply_enabled: false,
        require_confirmation: true,
    });
    let (_, body) = disabled.post("/mcp/tools/list", &analyst(), json!({})).await;
    assert_eq!(body["tools"].as_array().unwrap().len(), 1);

    let (status, body) = disabled
        .post(
            "/mcp/tools/call",
            &admin(),
            json!({"name": "apply_knowledge", "arguments": {"action": "bulk_review"}}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ENTITY_NOT_FOUND");
}

#[tokio::test]
async fn capture_records_caller_identity_from_headers() {
    let app = TestApp::new();
    let (is_error, payload) = app
        .call_tool(
            "capture_insight",
            json!({
                "category": "data_quality",
                "insight_text": "Timestamps before March are stored in local time.",
                "entity_urns": [ORDERS_URN],
                "confidence": "high"
            }),
            &analyst(),
        )
        .await;

    assert!(!is_error);
    assert_eq!(payload["status"], "pending");
    assert_eq!(
        payload["message"],
        "Insight captured. It will be reviewed by a data catalog administrator."
    );

    let stored = app
        .insights
        .get(payload["insight_id"].as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(stored.captured_by, "ana@example.com");
    assert_eq!(stored.session_id, "sess-analyst");
    assert_eq!(stored.persona, "analyst");
    assert_eq!(stored.status, InsightStatus::Pending);
}

#[tokio::test]
async fn tool_failures_are_payloads_not_http_errors() {
    let app = TestApp::new();

    let (is_error, payload) = app.call_tool("capture_insight", json!({}), &analyst()).await;
    assert!(is_error);
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .starts_with("category is required and must be one of:"));

    let (is_error, payload) = app
        .call_tool("apply_knowledge", json!({"action": "review"}), &admin())
        .await;
    assert!(is_error);
    assert_eq!(payload["error"], "entity_urn is required for review action");
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/mcp/tools/call",
            &analyst(),
            json!({"name": "drop_table", "arguments": {}}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "unknown tool: drop_table");
}

#[tokio::test]
async fn apply_over_http_previews_then_writes() {
    let app = TestApp::new();
    let arguments = json!({
        "action": "apply",
        "entity_urn": ORDERS_URN,
        "changes": [
            {"change_type": "update_description", "detail": "Orders, one row per checkout"},
            {"change_type": "add_tag", "detail": "finance"}
        ]
    });

    let (is_error, preview) = app
        .call_tool("apply_knowledge", arguments.clone(), &admin())
        .await;
    assert!(!is_error);
    assert_eq!(preview["confirmation_required"], true);
    assert_eq!(preview["changes_count"], 2);
    assert!(app.catalog.writes().is_empty());

    let mut confirmed = arguments;
    confirmed["confirm"] = json!(true);
    let (is_error, applied) = app.call_tool("apply_knowledge", confirmed, &admin()).await;
    assert!(!is_error);
    assert_eq!(applied["changes_applied"], 2);

    let writes = app.catalog.writes();
    assert_eq!(writes.len(), 2);
    assert!(matches!(
        &writes[0],
        CatalogWrite::Description { description, .. } if description == "Orders, one row per checkout"
    ));
    assert_eq!(app.catalog.added_tags(), vec!["urn:li:tag:finance".to_string()]);
}

#[tokio::test]
async fn capture_guidance_prompt() {
    let app = TestApp::new();

    let (status, body) = app.post("/mcp/prompts/list", &analyst(), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prompts"][0]["name"], "knowledge_capture_guidance");

    let (status, body) = app
        .post(
            "/mcp/prompts/get",
            &analyst(),
            json!({"name": "knowledge_capture_guidance"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"]["type"], "text");
    let text = body["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("agent_discovery"));

    let (status, _) = app
        .post("/mcp/prompts/get", &analyst(), json!({"name": "nope"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
