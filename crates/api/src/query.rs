//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the repository layer via `clamp_limit` /
/// `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Pagination plus an optional `?status=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct StatusListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
}

/// Pagination plus an optional `?action=` filter for the audit log.
#[derive(Debug, Default, Deserialize)]
pub struct AuditListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub action: Option<String>,
}
