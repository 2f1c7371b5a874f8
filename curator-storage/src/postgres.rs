//! PostgreSQL stores over a deadpool connection pool.
//!
//! Collections, snapshots and diffs live in JSONB columns. Entity membership
//! uses `entity_urns @> '["<urn>"]'`, served by a GIN index. Guarded updates
//! (`update`, `mark_applied`, `rollback_changeset`) are single conditional
//! `UPDATE`s.

use crate::{ChangesetStore, InsightStore};
use async_trait::async_trait;
use curator_core::{
    lifecycle, Category, ChangeSummary, Changeset, ChangesetFilter, Confidence, CuratorError,
    CuratorResult, EnumParseError, Insight, InsightFilter, InsightStats, InsightStatus,
    InsightUpdate, Source, StorageError,
};
use deadpool_postgres::{Object, Pool};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::Row;

/// Schema applied by [`bootstrap`]. Every statement is `IF NOT EXISTS`.
pub const BOOTSTRAP_SQL: &str = include_str!("../sql/knowledge_init.sql");

/// Create the knowledge tables and indexes if they are missing.
pub async fn bootstrap(pool: &Pool) -> CuratorResult<()> {
    let conn = get_conn(pool).await?;
    conn.batch_execute(BOOTSTRAP_SQL)
        .await
        .map_err(db_err("bootstrapping knowledge schema"))?;
    tracing::info!("Knowledge schema ready");
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

async fn get_conn(pool: &Pool) -> CuratorResult<Object> {
    pool.get().await.map_err(|e| {
        StorageError::Backend {
            reason: format!("acquiring connection: {e}"),
        }
        .into()
    })
}

fn db_err(context: &'static str) -> impl Fn(tokio_postgres::Error) -> CuratorError {
    move |e| {
        StorageError::Backend {
            reason: format!("{context}: {e}"),
        }
        .into()
    }
}

type Param = Box<dyn ToSql + Sync + Send>;

/// Positional parameters plus the `WHERE` conditions that reference them.
#[derive(Default)]
struct QueryParams {
    conditions: Vec<String>,
    values: Vec<Param>,
}

impl QueryParams {
    /// Bind a value and return its `$n` placeholder.
    fn bind(&mut self, value: impl ToSql + Sync + Send + 'static) -> String {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    /// Add `<lhs> <placeholder>` to the conditions.
    fn and(&mut self, lhs: &str, value: impl ToSql + Sync + Send + 'static) {
        let placeholder = self.bind(value);
        self.conditions.push(format!("{lhs} {placeholder}"));
    }

    fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T, StorageError> {
    row.try_get(name).map_err(|e| StorageError::Backend {
        reason: format!("reading column {name}: {e}"),
    })
}

fn json_column<T: DeserializeOwned>(
    row: &Row,
    name: &str,
    kind: &'static str,
    id: &str,
) -> Result<T, StorageError> {
    let raw: JsonValue = column(row, name)?;
    serde_json::from_value(raw).map_err(|e| StorageError::CorruptRecord {
        kind,
        id: id.to_string(),
        reason: format!("{name}: {e}"),
    })
}

fn enum_column<T>(
    row: &Row,
    name: &str,
    kind: &'static str,
    id: &str,
    parse: fn(&str) -> Result<T, EnumParseError>,
) -> Result<T, StorageError> {
    let raw: String = column(row, name)?;
    parse(&raw).map_err(|e| StorageError::CorruptRecord {
        kind,
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> Result<JsonValue, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::Backend {
        reason: format!("encoding {what}: {e}"),
    })
}

fn count_from(row: &Row) -> Result<u64, StorageError> {
    let n: i64 = column(row, "total")?;
    Ok(u64::try_from(n).unwrap_or_default())
}

// ============================================================================
// INSIGHT STORE
// ============================================================================

const INSIGHT_COLUMNS: &str = "id, created_at, session_id, captured_by, persona, source, \
     category, insight_text, confidence, entity_urns, related_columns, suggested_actions, \
     status, reviewed_by, reviewed_at, review_notes, applied_by, applied_at, changeset_ref";

fn insight_params(filter: &InsightFilter) -> QueryParams {
    let mut params = QueryParams::default();
    if let Some(status) = filter.status {
        params.and("status =", status.as_db_str().to_string());
    }
    if let Some(category) = filter.category {
        params.and("category =", category.as_db_str().to_string());
    }
    if let Some(urn) = &filter.entity_urn {
        params.and("entity_urns @>", serde_json::json!([urn]));
    }
    if let Some(captured_by) = &filter.captured_by {
        params.and("captured_by =", captured_by.clone());
    }
    if let Some(confidence) = filter.confidence {
        params.and("confidence =", confidence.as_db_str().to_string());
    }
    if let Some(since) = filter.since {
        params.and("created_at >=", since);
    }
    if let Some(until) = filter.until {
        params.and("created_at <=", until);
    }
    params
}

fn insight_from_row(row: &Row) -> Result<Insight, StorageError> {
    const KIND: &str = "insight";
    let id: String = column(row, "id")?;
    Ok(Insight {
        created_at: column(row, "created_at")?,
        session_id: column(row, "session_id")?,
        captured_by: column(row, "captured_by")?,
        persona: column(row, "persona")?,
        source: enum_column(row, "source", KIND, &id, Source::from_db_str)?,
        category: enum_column(row, "category", KIND, &id, Category::from_db_str)?,
        insight_text: column(row, "insight_text")?,
        confidence: enum_column(row, "confidence", KIND, &id, Confidence::from_db_str)?,
        entity_urns: json_column(row, "entity_urns", KIND, &id)?,
        related_columns: json_column(row, "related_columns", KIND, &id)?,
        suggested_actions: json_column(row, "suggested_actions", KIND, &id)?,
        status: enum_column(row, "status", KIND, &id, InsightStatus::from_db_str)?,
        reviewed_by: column(row, "reviewed_by")?,
        reviewed_at: column(row, "reviewed_at")?,
        review_notes: column(row, "review_notes")?,
        applied_by: column(row, "applied_by")?,
        applied_at: column(row, "applied_at")?,
        changeset_ref: column(row, "changeset_ref")?,
        id,
    })
}

/// Insight store backed by the `knowledge_insights` table.
#[derive(Clone)]
pub struct PgInsightStore {
    pool: Pool,
}

impl PgInsightStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn count_by<T: Ord>(
        &self,
        dimension: &str,
        filter: &InsightFilter,
        parse: fn(&str) -> Result<T, EnumParseError>,
    ) -> CuratorResult<BTreeMap<T, u64>> {
        let conn = get_conn(&self.pool).await?;
        let params = insight_params(filter);
        let sql = format!(
            "SELECT {dimension} AS key, COUNT(*) AS total FROM knowledge_insights{} GROUP BY {dimension}",
            params.where_sql()
        );
        let rows = conn
            .query(sql.as_str(), &params.refs())
            .await
            .map_err(db_err("counting insights"))?;

        let mut counts = BTreeMap::new();
        for row in &rows {
            let key: String = column(row, "key")?;
            match parse(&key) {
                Ok(value) => {
                    counts.insert(value, count_from(row)?);
                }
                Err(e) => tracing::warn!(dimension, error = %e, "Skipping unknown value in stats"),
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn get(&self, id: &str) -> CuratorResult<Insight> {
        let conn = get_conn(&self.pool).await?;
        let sql = format!("SELECT {INSIGHT_COLUMNS} FROM knowledge_insights WHERE id = $1");
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(db_err("querying insight"))?
            .ok_or_else(|| StorageError::InsightNotFound { id: id.to_string() })?;
        Ok(insight_from_row(&row)?)
    }

    async fn list(&self, filter: &InsightFilter) -> CuratorResult<(Vec<Insight>, u64)> {
        let conn = get_conn(&self.pool).await?;
        let mut params = insight_params(filter);
        let where_sql = params.where_sql();

        let count_sql = format!("SELECT COUNT(*) AS total FROM knowledge_insights{where_sql}");
        let total = {
            let row = conn
                .query_one(count_sql.as_str(), &params.refs())
                .await
                .map_err(db_err("counting insights"))?;
            count_from(&row)?
        };

        let limit = params.bind(filter.effective_limit());
        let offset = params.bind(filter.effective_offset());
        let select_sql = format!(
            "SELECT {INSIGHT_COLUMNS} FROM knowledge_insights{where_sql} \
             ORDER BY created_at DESC, id DESC LIMIT {limit} OFFSET {offset}"
        );
        let rows = conn
            .query(select_sql.as_str(), &params.refs())
            .await
            .map_err(db_err("querying insights"))?;

        let insights = rows
            .iter()
            .map(insight_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((insights, total))
    }

    async fn stats(&self, filter: &InsightFilter) -> CuratorResult<InsightStats> {
        let by_status = self.count_by("status", filter, InsightStatus::from_db_str).await?;
        let by_category = self.count_by("category", filter, Category::from_db_str).await?;
        let by_confidence = self
            .count_by("confidence", filter, Confidence::from_db_str)
            .await?;
        Ok(InsightStats {
            total_pending: by_status.get(&InsightStatus::Pending).copied().unwrap_or(0),
            by_status,
            by_category,
            by_confidence,
        })
    }

    async fn insert(&self, insight: &Insight) -> CuratorResult<()> {
        let conn = get_conn(&self.pool).await?;
        let entity_urns = to_json(&insight.entity_urns, "entity_urns")?;
        let related_columns = to_json(&insight.related_columns, "related_columns")?;
        let suggested_actions = to_json(&insight.suggested_actions, "suggested_actions")?;

        let result = conn
            .execute(
                "INSERT INTO knowledge_insights \
                 (id, created_at, session_id, captured_by, persona, source, category, \
                  insight_text, confidence, entity_urns, related_columns, suggested_actions, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
                &[
                    &insight.id,
                    &insight.created_at,
                    &insight.session_id,
                    &insight.captured_by,
                    &insight.persona,
                    &insight.source.as_db_str(),
                    &insight.category.as_db_str(),
                    &insight.insight_text,
                    &insight.confidence.as_db_str(),
                    &entity_urns,
                    &related_columns,
                    &suggested_actions,
                    &insight.status.as_db_str(),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StorageError::AlreadyExists {
                    kind: "insight",
                    id: insight.id.clone(),
                }
                .into())
            }
            Err(e) => Err(db_err("inserting insight")(e)),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: InsightStatus,
        reviewed_by: &str,
        review_notes: &str,
    ) -> CuratorResult<()> {
        let conn = get_conn(&self.pool).await?;
        let updated = conn
            .execute(
                "UPDATE knowledge_insights \
                 SET status = $1, reviewed_by = NULLIF($2, ''), reviewed_at = NOW(), \
                     review_notes = NULLIF($3, '') \
                 WHERE id = $4",
                &[&status.as_db_str(), &reviewed_by, &review_notes, &id],
            )
            .await
            .map_err(db_err("updating insight status"))?;
        if updated == 0 {
            return Err(StorageError::InsightNotFound { id: id.to_string() }.into());
        }
        Ok(())
    }

    async fn update(&self, id: &str, update: &InsightUpdate) -> CuratorResult<()> {
        let mut params = QueryParams::default();
        let mut sets = Vec::new();
        if let Some(text) = &update.insight_text {
            sets.push(format!("insight_text = {}", params.bind(text.clone())));
        }
        if let Some(category) = update.category {
            sets.push(format!("category = {}", params.bind(category.as_db_str().to_string())));
        }
        if let Some(confidence) = update.confidence {
            sets.push(format!(
                "confidence = {}",
                params.bind(confidence.as_db_str().to_string())
            ));
        }
        if sets.is_empty() {
            return Err(StorageError::NoFieldsToUpdate.into());
        }
        let id_placeholder = params.bind(id.to_string());
        let sql = format!(
            "UPDATE knowledge_insights SET {} WHERE id = {id_placeholder} AND status <> 'applied'",
            sets.join(", ")
        );

        let conn = get_conn(&self.pool).await?;
        let updated = conn
            .execute(sql.as_str(), &params.refs())
            .await
            .map_err(db_err("updating insight"))?;
        if updated == 0 {
            return Err(StorageError::InsightNotEditable { id: id.to_string() }.into());
        }
        Ok(())
    }

    async fn mark_applied(
        &self,
        id: &str,
        applied_by: &str,
        changeset_ref: &str,
    ) -> CuratorResult<()> {
        let from: Vec<&str> = lifecycle::predecessors(InsightStatus::Applied)
            .iter()
            .map(InsightStatus::as_db_str)
            .collect();
        let conn = get_conn(&self.pool).await?;
        let updated = conn
            .execute(
                "UPDATE knowledge_insights \
                 SET status = $1, applied_by = $2, applied_at = NOW(), changeset_ref = $3 \
                 WHERE id = $4 AND status = ANY($5)",
                &[
                    &InsightStatus::Applied.as_db_str(),
                    &applied_by,
                    &changeset_ref,
                    &id,
                    &from,
                ],
            )
            .await
            .map_err(db_err("marking insight applied"))?;
        if updated > 0 {
            return Ok(());
        }

        let current = conn
            .query_opt("SELECT status FROM knowledge_insights WHERE id = $1", &[&id])
            .await
            .map_err(db_err("reading insight status"))?;
        match current {
            Some(row) => {
                let status = enum_column(&row, "status", "insight", id, InsightStatus::from_db_str)?;
                lifecycle::validate_transition(status, InsightStatus::Applied)?;
                Err(StorageError::Backend {
                    reason: format!("insight {id} changed status while being marked applied"),
                }
                .into())
            }
            None => Err(StorageError::InsightNotFound { id: id.to_string() }.into()),
        }
    }

    async fn supersede(&self, entity_urn: &str, exclude_id: &str) -> CuratorResult<u64> {
        let conn = get_conn(&self.pool).await?;
        let membership = serde_json::json!([entity_urn]);
        let moved = conn
            .execute(
                "UPDATE knowledge_insights SET status = $1 \
                 WHERE status = $2 AND entity_urns @> $3 AND id <> $4",
                &[
                    &InsightStatus::Superseded.as_db_str(),
                    &InsightStatus::Pending.as_db_str(),
                    &membership,
                    &exclude_id,
                ],
            )
            .await
            .map_err(db_err("superseding insights"))?;
        Ok(moved)
    }
}

// ============================================================================
// CHANGESET STORE
// ============================================================================

const CHANGESET_COLUMNS: &str = "id, created_at, target_urn, change_type, previous_value, \
     new_value, source_insight_ids, approved_by, applied_by, rolled_back, rolled_back_by, \
     rolled_back_at";

fn changeset_params(filter: &ChangesetFilter) -> QueryParams {
    let mut params = QueryParams::default();
    if let Some(urn) = &filter.entity_urn {
        params.and("target_urn =", urn.clone());
    }
    if let Some(applied_by) = &filter.applied_by {
        params.and("applied_by =", applied_by.clone());
    }
    if let Some(since) = filter.since {
        params.and("created_at >=", since);
    }
    if let Some(until) = filter.until {
        params.and("created_at <=", until);
    }
    if let Some(rolled_back) = filter.rolled_back {
        params.and("rolled_back =", rolled_back);
    }
    params
}

fn changeset_from_row(row: &Row) -> Result<Changeset, StorageError> {
    const KIND: &str = "changeset";
    let id: String = column(row, "id")?;
    Ok(Changeset {
        created_at: column(row, "created_at")?,
        target_urn: column(row, "target_urn")?,
        change_type: enum_column(row, "change_type", KIND, &id, ChangeSummary::from_db_str)?,
        previous_value: json_column(row, "previous_value", KIND, &id)?,
        new_value: json_column(row, "new_value", KIND, &id)?,
        source_insight_ids: json_column(row, "source_insight_ids", KIND, &id)?,
        approved_by: column(row, "approved_by")?,
        applied_by: column(row, "applied_by")?,
        rolled_back: column(row, "rolled_back")?,
        rolled_back_by: column(row, "rolled_back_by")?,
        rolled_back_at: column(row, "rolled_back_at")?,
        id,
    })
}

/// Changeset store backed by the `knowledge_changesets` table.
#[derive(Clone)]
pub struct PgChangesetStore {
    pool: Pool,
}

impl PgChangesetStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangesetStore for PgChangesetStore {
    async fn insert_changeset(&self, changeset: &Changeset) -> CuratorResult<()> {
        let previous_value = to_json(&changeset.previous_value, "previous_value")?;
        let new_value = to_json(&changeset.new_value, "new_value")?;
        let source_ids = to_json(&changeset.source_insight_ids, "source_insight_ids")?;

        let conn = get_conn(&self.pool).await?;
        let result = conn
            .execute(
                "INSERT INTO knowledge_changesets \
                 (id, created_at, target_urn, change_type, previous_value, new_value, \
                  source_insight_ids, approved_by, applied_by) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &changeset.id,
                    &changeset.created_at,
                    &changeset.target_urn,
                    &changeset.change_type.as_db_str(),
                    &previous_value,
                    &new_value,
                    &source_ids,
                    &changeset.approved_by,
                    &changeset.applied_by,
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StorageError::AlreadyExists {
                    kind: "changeset",
                    id: changeset.id.clone(),
                }
                .into())
            }
            Err(e) => Err(db_err("inserting changeset")(e)),
        }
    }

    async fn get_changeset(&self, id: &str) -> CuratorResult<Changeset> {
        let conn = get_conn(&self.pool).await?;
        let sql = format!("SELECT {CHANGESET_COLUMNS} FROM knowledge_changesets WHERE id = $1");
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(db_err("querying changeset"))?
            .ok_or_else(|| StorageError::ChangesetNotFound { id: id.to_string() })?;
        Ok(changeset_from_row(&row)?)
    }

    async fn list_changesets(
        &self,
        filter: &ChangesetFilter,
    ) -> CuratorResult<(Vec<Changeset>, u64)> {
        let conn = get_conn(&self.pool).await?;
        let mut params = changeset_params(filter);
        let where_sql = params.where_sql();

        let count_sql = format!("SELECT COUNT(*) AS total FROM knowledge_changesets{where_sql}");
        let total = {
            let row = conn
                .query_one(count_sql.as_str(), &params.refs())
                .await
                .map_err(db_err("counting changesets"))?;
            count_from(&row)?
        };

        let limit = params.bind(filter.effective_limit());
        let offset = params.bind(filter.effective_offset());
        let select_sql = format!(
            "SELECT {CHANGESET_COLUMNS} FROM knowledge_changesets{where_sql} \
             ORDER BY created_at DESC, id DESC LIMIT {limit} OFFSET {offset}"
        );
        let rows = conn
            .query(select_sql.as_str(), &params.refs())
            .await
            .map_err(db_err("querying changesets"))?;

        let changesets = rows
            .iter()
            .map(changeset_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((changesets, total))
    }

    async fn rollback_changeset(&self, id: &str, rolled_back_by: &str) -> CuratorResult<()> {
        let conn = get_conn(&self.pool).await?;
        let updated = conn
            .execute(
                "UPDATE knowledge_changesets \
                 SET rolled_back = TRUE, rolled_back_by = $1, rolled_back_at = NOW() \
                 WHERE id = $2 AND rolled_back = FALSE",
                &[&rolled_back_by, &id],
            )
            .await
            .map_err(db_err("rolling back changeset"))?;
        if updated == 0 {
            return Err(StorageError::ChangesetNotRollbackable { id: id.to_string() }.into());
        }
        Ok(())
    }
}
