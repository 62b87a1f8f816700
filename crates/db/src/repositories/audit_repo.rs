//! Repository for the append-only `audit_logs` table.
//!
//! No update or delete methods exist. A trigger rejects both in the database.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};
use crate::{clamp_limit, clamp_offset};

use super::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str =
    "id, actor_id, action, entity_type, entity_id, details_json, created_at";

/// Provides append and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (actor_id, action, entity_type, entity_id, details_json) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.actor_id)
            .bind(&entry.action)
            .bind(&entry.entity_type)
            .bind(&entry.entity_id)
            .bind(&entry.details_json)
            .fetch_one(pool)
            .await
    }

    /// Newest entries first, optionally restricted to one action.
    pub async fn list_recent(
        pool: &PgPool,
        action: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE ($1::TEXT IS NULL OR action = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(action)
            .bind(clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM audit_logs")
            .fetch_one(pool)
            .await
    }
}
