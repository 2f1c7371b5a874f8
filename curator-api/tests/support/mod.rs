//! In-process HTTP harness shared by the route tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use curator_api::{create_api_router, ApiConfig, AppState};
use curator_core::{Actor, KnowledgeConfig};
use curator_knowledge::KnowledgeEngine;
use curator_test_utils::fixtures::{orders_metadata, ORDERS_URN};
use curator_test_utils::{InMemoryChangesetStore, InMemoryInsightStore, RecordingCatalogWriter};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub insights: InMemoryInsightStore,
    pub changesets: InMemoryChangesetStore,
    pub catalog: Arc<RecordingCatalogWriter>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(KnowledgeConfig::default())
    }

    pub fn with_config(config: KnowledgeConfig) -> Self {
        let insights = InMemoryInsightStore::new();
        let changesets = InMemoryChangesetStore::new();
        let catalog =
            Arc::new(RecordingCatalogWriter::new().with_metadata(ORDERS_URN, orders_metadata()));
        let engine = KnowledgeEngine::new(
            Arc::new(insights.clone()),
            Arc::new(changesets.clone()),
            catalog.clone(),
        )
        .with_config(config);
        let router = create_api_router(AppState::new(engine), &ApiConfig::default());
        Self {
            router,
            insights,
            changesets,
            catalog,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        actor: Option<&Actor>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder
                .header("x-session-id", actor.session_id.as_str())
                .header("x-user-id", actor.user_id.as_str())
                .header("x-persona", actor.persona.as_str());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, JsonValue) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, actor: &Actor, body: JsonValue) -> (StatusCode, JsonValue) {
        self.send(Method::POST, uri, Some(actor), Some(body)).await
    }

    pub async fn put(&self, uri: &str, actor: &Actor, body: JsonValue) -> (StatusCode, JsonValue) {
        self.send(Method::PUT, uri, Some(actor), Some(body)).await
    }

    /// Call an MCP tool and decode the text block back into JSON.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonValue,
        actor: &Actor,
    ) -> (bool, JsonValue) {
        let (status, body) = self
            .post(
                "/mcp/tools/call",
                actor,
                serde_json::json!({"name": name, "arguments": arguments}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "tool call failed: {body}");
        let text = body["content"][0]["text"].as_str().unwrap();
        (
            body["is_error"].as_bool().unwrap(),
            serde_json::from_str(text).unwrap(),
        )
    }
}
