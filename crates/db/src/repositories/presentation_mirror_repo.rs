//! Repository for the `presentation_mirrors` table.

use sqlx::PgPool;

use crate::models::presentation::{PresentationMirror, UpsertPresentationMirror};
use crate::models::stats::StatusCount;
use crate::{clamp_limit, clamp_offset};

use super::{MirrorListQuery, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

const COLUMNS: &str = "\
    id, plan_id, job_id, org_id, user_id, title, status, language, \
    slides_count, pptx_url, pdf_url, html_url, synced_at, created_at, updated_at";

/// Provides upsert, listing and aggregate queries for presentation mirrors.
pub struct PresentationMirrorRepo;

impl PresentationMirrorRepo {
    /// Insert or refresh a mirror keyed on `plan_id`.
    ///
    /// `status` is always overwritten. Other `None` fields keep what is
    /// already stored. `synced_at` is bumped on every call.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertPresentationMirror,
    ) -> Result<PresentationMirror, sqlx::Error> {
        let query = format!(
            "INSERT INTO presentation_mirrors \
                 (plan_id, job_id, org_id, user_id, title, status, language, slides_count, \
                  pptx_url, pdf_url, html_url) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'en'), COALESCE($8, 0), $9, $10, $11) \
             ON CONFLICT (plan_id) DO UPDATE SET \
                 job_id = COALESCE(EXCLUDED.job_id, presentation_mirrors.job_id), \
                 org_id = COALESCE(EXCLUDED.org_id, presentation_mirrors.org_id), \
                 user_id = COALESCE(EXCLUDED.user_id, presentation_mirrors.user_id), \
                 title = COALESCE(EXCLUDED.title, presentation_mirrors.title), \
                 status = EXCLUDED.status, \
                 language = COALESCE($7, presentation_mirrors.language), \
                 slides_count = COALESCE($8, presentation_mirrors.slides_count), \
                 pptx_url = COALESCE(EXCLUDED.pptx_url, presentation_mirrors.pptx_url), \
                 pdf_url = COALESCE(EXCLUDED.pdf_url, presentation_mirrors.pdf_url), \
                 html_url = COALESCE(EXCLUDED.html_url, presentation_mirrors.html_url), \
                 synced_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PresentationMirror>(&query)
            .bind(&input.plan_id)
            .bind(&input.job_id)
            .bind(input.org_id)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.status)
            .bind(&input.language)
            .bind(input.slides_count)
            .bind(&input.pptx_url)
            .bind(&input.pdf_url)
            .bind(&input.html_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_plan_id(
        pool: &PgPool,
        plan_id: &str,
    ) -> Result<Option<PresentationMirror>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM presentation_mirrors WHERE plan_id = $1");
        sqlx::query_as::<_, PresentationMirror>(&query)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently created mirror for a kernel job id.
    pub async fn find_by_job_id(
        pool: &PgPool,
        job_id: &str,
    ) -> Result<Option<PresentationMirror>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM presentation_mirrors WHERE job_id = $1 \
             ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, PresentationMirror>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Newest mirrors first, optionally filtered by owner and status.
    pub async fn list(
        pool: &PgPool,
        params: &MirrorListQuery,
    ) -> Result<Vec<PresentationMirror>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM presentation_mirrors \
             WHERE ($1::BIGINT IS NULL OR user_id = $1) \
               AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PresentationMirror>(&query)
            .bind(params.user_id)
            .bind(&params.status)
            .bind(clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Mirrors whose status is in `statuses`, least recently synced first.
    pub async fn list_stale(
        pool: &PgPool,
        statuses: &[String],
        limit: i64,
    ) -> Result<Vec<PresentationMirror>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM presentation_mirrors \
             WHERE status = ANY($1) \
             ORDER BY synced_at ASC, id ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, PresentationMirror>(&query)
            .bind(statuses)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM presentation_mirrors")
            .fetch_one(pool)
            .await
    }

    /// Row counts grouped by status, largest group first.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count FROM presentation_mirrors \
             GROUP BY status ORDER BY count DESC, status ASC",
        )
        .fetch_all(pool)
        .await
    }
}
