//! Insight review routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use curator_core::{Insight, InsightEditInput, InsightStats, InsightStatus};
use curator_knowledge::KnowledgeEngine;

use super::types::{InsightListQuery, InsightListResponse, UpdateStatusRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ActorExtractor;

/// GET /api/v1/admin/knowledge/insights - List insights
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/admin/knowledge/insights",
    tag = "Insights",
    params(InsightListQuery),
    responses(
        (status = 200, description = "Page of insights, newest first", body = InsightListResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
    ),
))]
pub async fn list_insights(
    State(engine): State<KnowledgeEngine>,
    Query(query): Query<InsightListQuery>,
) -> ApiResult<Json<InsightListResponse>> {
    let filter = query.to_filter()?;
    let page = query.page();
    let (data, total) = engine.insights().list(&filter).await?;
    Ok(Json(InsightListResponse {
        data,
        total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// GET /api/v1/admin/knowledge/insights/stats - Aggregate counts
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/admin/knowledge/insights/stats",
    tag = "Insights",
    params(InsightListQuery),
    responses(
        (status = 200, description = "Counts by status, category and confidence", body = InsightStats),
        (status = 400, description = "Invalid filter", body = ApiError),
    ),
))]
pub async fn insight_stats(
    State(engine): State<KnowledgeEngine>,
    Query(query): Query<InsightListQuery>,
) -> ApiResult<Json<InsightStats>> {
    let filter = query.to_filter()?;
    Ok(Json(engine.insights().stats(&filter).await?))
}

/// GET /api/v1/admin/knowledge/insights/{id} - Get one insight
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/admin/knowledge/insights/{id}",
    tag = "Insights",
    params(("id" = String, Path, description = "Insight ID")),
    responses(
        (status = 200, description = "Insight", body = Insight),
        (status = 404, description = "Insight not found", body = ApiError),
    ),
))]
pub async fn get_insight(
    State(engine): State<KnowledgeEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Insight>> {
    Ok(Json(engine.insights().get(&id).await?))
}

/// PUT /api/v1/admin/knowledge/insights/{id}/status - Approve or reject
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/v1/admin/knowledge/insights/{id}/status",
    tag = "Insights",
    params(("id" = String, Path, description = "Insight ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated insight", body = Insight),
        (status = 400, description = "Status is not approved or rejected", body = ApiError),
        (status = 404, description = "Insight not found", body = ApiError),
        (status = 409, description = "Transition not allowed", body = ApiError),
    ),
))]
pub async fn update_insight_status(
    State(engine): State<KnowledgeEngine>,
    ActorExtractor(actor): ActorExtractor,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Insight>> {
    let status: InsightStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::validation_failed("status must be 'approved' or 'rejected'"))?;
    engine
        .set_status(&id, status, &req.review_notes, &actor)
        .await?;
    Ok(Json(engine.insights().get(&id).await?))
}

/// PUT /api/v1/admin/knowledge/insights/{id} - Edit text, category or confidence
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/v1/admin/knowledge/insights/{id}",
    tag = "Insights",
    params(("id" = String, Path, description = "Insight ID")),
    request_body = InsightEditInput,
    responses(
        (status = 200, description = "Updated insight", body = Insight),
        (status = 400, description = "Invalid edit", body = ApiError),
        (status = 404, description = "Insight not found", body = ApiError),
        (status = 409, description = "Insight already applied", body = ApiError),
    ),
))]
pub async fn edit_insight(
    State(engine): State<KnowledgeEngine>,
    Path(id): Path<String>,
    Json(input): Json<InsightEditInput>,
) -> ApiResult<Json<Insight>> {
    engine.edit(&id, input).await?;
    tracing::info!(insight_id = %id, "Insight edited");
    Ok(Json(engine.insights().get(&id).await?))
}
