//! Repository for the `dubbing_mirrors` table.

use sqlx::PgPool;

use crate::models::dubbing::{DubbingMirror, UpsertDubbingMirror};
use crate::models::stats::StatusCount;
use crate::{clamp_limit, clamp_offset};

use super::{MirrorListQuery, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

const COLUMNS: &str = "\
    id, job_id, org_id, user_id, source_language, target_language, status, \
    output_url, synced_at, created_at, updated_at";

pub struct DubbingMirrorRepo;

impl DubbingMirrorRepo {
    /// Insert or refresh a mirror keyed on `job_id`.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertDubbingMirror,
    ) -> Result<DubbingMirror, sqlx::Error> {
        let query = format!(
            "INSERT INTO dubbing_mirrors \
                 (job_id, org_id, user_id, source_language, target_language, status, output_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (job_id) DO UPDATE SET \
                 org_id = COALESCE(EXCLUDED.org_id, dubbing_mirrors.org_id), \
                 user_id = COALESCE(EXCLUDED.user_id, dubbing_mirrors.user_id), \
                 source_language = EXCLUDED.source_language, \
                 target_language = EXCLUDED.target_language, \
                 status = EXCLUDED.status, \
                 output_url = COALESCE(EXCLUDED.output_url, dubbing_mirrors.output_url), \
                 synced_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DubbingMirror>(&query)
            .bind(&input.job_id)
            .bind(input.org_id)
            .bind(input.user_id)
            .bind(&input.source_language)
            .bind(&input.target_language)
            .bind(&input.status)
            .bind(&input.output_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_job_id(
        pool: &PgPool,
        job_id: &str,
    ) -> Result<Option<DubbingMirror>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dubbing_mirrors WHERE job_id = $1");
        sqlx::query_as::<_, DubbingMirror>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &MirrorListQuery,
    ) -> Result<Vec<DubbingMirror>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dubbing_mirrors \
             WHERE ($1::BIGINT IS NULL OR user_id = $1) \
               AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, DubbingMirror>(&query)
            .bind(params.user_id)
            .bind(&params.status)
            .bind(clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM dubbing_mirrors")
            .fetch_one(pool)
            .await
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count FROM dubbing_mirrors \
             GROUP BY status ORDER BY count DESC, status ASC",
        )
        .fetch_all(pool)
        .await
    }
}
