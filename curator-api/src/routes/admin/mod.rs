//! Admin REST routes for reviewing insights and auditing changesets.
//!
//! Mounted under `/api/v1/admin/knowledge`. Access control is left to the
//! fronting proxy; the acting user comes from the identity headers.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub mod changesets;
pub mod insights;
pub mod types;

pub use changesets::*;
pub use insights::*;
pub use types::*;

pub const ADMIN_PREFIX: &str = "/api/v1/admin/knowledge";

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/insights", get(list_insights))
        .route("/insights/stats", get(insight_stats))
        .route("/insights/:id", get(get_insight).put(edit_insight))
        .route("/insights/:id/status", put(update_insight_status))
        .route("/changesets", get(list_changesets))
        .route("/changesets/:id", get(get_changeset))
        .route("/changesets/:id/rollback", post(rollback_changeset))
}
