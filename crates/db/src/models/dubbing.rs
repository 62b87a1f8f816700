//! Dubbing job mirror.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sharayeh_core::types::{DbId, Timestamp};

/// Local copy of a kernel dubbing job, keyed on `job_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DubbingMirror {
    pub id: DbId,
    pub job_id: String,
    pub org_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub source_language: String,
    pub target_language: String,
    pub status: String,
    pub output_url: Option<String>,
    pub synced_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertDubbingMirror {
    pub job_id: String,
    pub org_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub source_language: String,
    pub target_language: String,
    pub status: String,
    pub output_url: Option<String>,
}
