//! Identity mirrors: orgs, user profiles and memberships.
//!
//! The auth provider owns these records. They are cached here only so
//! dashboard and admin queries can join on them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sharayeh_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Org {
    pub id: DbId,
    pub external_id: String,
    pub name: String,
    pub slug: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Upsert DTO keyed on `external_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertOrg {
    pub external_id: String,
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub locale: String,
    pub is_admin: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Upsert DTO keyed on `external_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUserProfile {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Defaults to `en` when absent.
    pub locale: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrgMember {
    pub id: DbId,
    pub org_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
