//! Repository for the `orgs` and `org_members` tables.

use sqlx::PgPool;
use sharayeh_core::types::DbId;

use crate::models::identity::{Org, OrgMember, UpsertOrg};

const COLUMNS: &str = "id, external_id, name, slug, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, org_id, user_id, role, created_at, updated_at";

/// Provides upsert and count operations for mirrored organizations.
pub struct OrgRepo;

impl OrgRepo {
    /// Insert or refresh an org keyed on its provider id.
    pub async fn upsert(pool: &PgPool, input: &UpsertOrg) -> Result<Org, sqlx::Error> {
        let query = format!(
            "INSERT INTO orgs (external_id, name, slug) VALUES ($1, $2, $3) \
             ON CONFLICT (external_id) DO UPDATE \
             SET name = EXCLUDED.name, slug = COALESCE(EXCLUDED.slug, orgs.slug) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Org>(&query)
            .bind(&input.external_id)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM orgs")
            .fetch_one(pool)
            .await
    }

    /// Add (or re-role) a member of an org.
    pub async fn upsert_member(
        pool: &PgPool,
        org_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<OrgMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO org_members (org_id, user_id, role) VALUES ($1, $2, $3) \
             ON CONFLICT (org_id, user_id) DO UPDATE SET role = EXCLUDED.role \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, OrgMember>(&query)
            .bind(org_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }
}
