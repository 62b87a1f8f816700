//! Audit log entity models and DTOs.
//!
//! Audit logs have no `updated_at` field (immutable records).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sharayeh_core::types::{DbId, Timestamp};

/// A single audit log entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub actor_id: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details_json: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending an audit log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditLog {
    pub actor_id: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details_json: serde_json::Value,
}

/// Action names written by the API.
pub mod actions {
    pub const SLIDES_JOB_CREATED: &str = "slides.job_created";
    pub const DUBBING_JOB_CREATED: &str = "dubbing.job_created";
    pub const UPLOAD_FORWARDED: &str = "upload.forwarded";
    pub const MIRROR_SYNCED: &str = "mirror.synced";
}
