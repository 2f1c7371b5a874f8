//! Changeset audit and rollback routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use curator_core::Changeset;
use curator_knowledge::KnowledgeEngine;

use super::types::{ChangesetListQuery, ChangesetListResponse, RollbackResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ActorExtractor;

/// GET /api/v1/admin/knowledge/changesets - List changesets
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/admin/knowledge/changesets",
    tag = "Changesets",
    params(ChangesetListQuery),
    responses(
        (status = 200, description = "Page of changesets, newest first", body = ChangesetListResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
    ),
))]
pub async fn list_changesets(
    State(engine): State<KnowledgeEngine>,
    Query(query): Query<ChangesetListQuery>,
) -> ApiResult<Json<ChangesetListResponse>> {
    let filter = query.to_filter()?;
    let page = query.page();
    let (data, total) = engine.changesets().list_changesets(&filter).await?;
    Ok(Json(ChangesetListResponse {
        data,
        total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// GET /api/v1/admin/knowledge/changesets/{id} - Get one changeset
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/admin/knowledge/changesets/{id}",
    tag = "Changesets",
    params(("id" = String, Path, description = "Changeset ID")),
    responses(
        (status = 200, description = "Changeset", body = Changeset),
        (status = 404, description = "Changeset not found", body = ApiError),
    ),
))]
pub async fn get_changeset(
    State(engine): State<KnowledgeEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Changeset>> {
    Ok(Json(engine.changesets().get_changeset(&id).await?))
}

/// POST /api/v1/admin/knowledge/changesets/{id}/rollback - Roll a changeset back
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/admin/knowledge/changesets/{id}/rollback",
    tag = "Changesets",
    params(("id" = String, Path, description = "Changeset ID")),
    responses(
        (status = 200, description = "Rollback result", body = RollbackResponse),
        (status = 404, description = "Changeset not found", body = ApiError),
        (status = 409, description = "Already rolled back", body = ApiError),
        (status = 502, description = "Catalog rejected the restore", body = ApiError),
    ),
))]
pub async fn rollback_changeset(
    State(engine): State<KnowledgeEngine>,
    ActorExtractor(actor): ActorExtractor,
    Path(id): Path<String>,
) -> ApiResult<Json<RollbackResponse>> {
    let outcome = engine.rollback_changeset(&id, &actor).await?;
    Ok(Json(outcome.into()))
}
