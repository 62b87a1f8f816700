//! Presentation job mirror.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sharayeh_core::types::{DbId, Timestamp};

/// Local copy of a kernel presentation job, keyed on `plan_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PresentationMirror {
    pub id: DbId,
    pub plan_id: String,
    pub job_id: Option<String>,
    pub org_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub title: Option<String>,
    pub status: String,
    pub language: String,
    pub slides_count: i32,
    pub pptx_url: Option<String>,
    pub pdf_url: Option<String>,
    pub html_url: Option<String>,
    pub synced_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Upsert DTO. `None` fields keep the stored value on conflict, so a partial
/// sync never erases data an earlier sync copied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertPresentationMirror {
    pub plan_id: String,
    pub job_id: Option<String>,
    pub org_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub title: Option<String>,
    /// Canonical status string (see `MirrorStatus`).
    pub status: String,
    pub language: Option<String>,
    pub slides_count: Option<i32>,
    pub pptx_url: Option<String>,
    pub pdf_url: Option<String>,
    pub html_url: Option<String>,
}
