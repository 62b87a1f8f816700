//! Repository for the `user_profiles` table.

use sqlx::PgPool;

use crate::models::identity::{UpsertUserProfile, UserProfile};
use crate::{clamp_limit, clamp_offset};

use super::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

const COLUMNS: &str =
    "id, external_id, email, display_name, locale, is_admin, created_at, updated_at";

/// Provides upsert and read operations for mirrored user profiles.
pub struct UserProfileRepo;

impl UserProfileRepo {
    /// Insert or refresh a profile keyed on its provider id.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertUserProfile,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles (external_id, email, display_name, locale, is_admin) \
             VALUES ($1, $2, $3, COALESCE($4, 'en'), $5) \
             ON CONFLICT (external_id) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 display_name = COALESCE(EXCLUDED.display_name, user_profiles.display_name), \
                 locale = COALESCE($4, user_profiles.locale), \
                 is_admin = EXCLUDED.is_admin \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(&input.external_id)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.locale)
            .bind(input.is_admin)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE external_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Newest profiles first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_profiles ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM user_profiles")
            .fetch_one(pool)
            .await
    }
}
