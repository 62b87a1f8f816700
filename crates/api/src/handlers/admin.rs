//! Admin aggregation handlers.
//!
//! Every figure comes from its own query, run concurrently. A failed query
//! contributes zero (or an empty list) and a warning; the response itself
//! is always `200 { "success": true, ... }`. The figures are not read in a
//! shared transaction and may be mutually inconsistent.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use sharayeh_core::types::Timestamp;
use sharayeh_db::models::audit::AuditLog;
use sharayeh_db::models::identity::UserProfile;
use sharayeh_db::models::presentation::PresentationMirror;
use sharayeh_db::models::stats::StatusCount;
use sharayeh_db::repositories::{
    AuditLogRepo, DubbingMirrorRepo, MirrorListQuery, OrgRepo, PresentationMirrorRepo,
    UserProfileRepo,
};

use crate::middleware::rbac::RequireAdmin;
use crate::query::{AuditListParams, PaginationParams, StatusListParams};
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Site-wide counters for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: i64,
    pub orgs: i64,
    pub presentations: i64,
    pub dubbings: i64,
    pub audit_events: i64,
    pub presentations_by_status: BTreeMap<String, i64>,
    pub dubbings_by_status: BTreeMap<String, i64>,
    pub generated_at: Timestamp,
}

fn count_or_zero(metric: &'static str, result: Result<i64, sqlx::Error>) -> i64 {
    result.unwrap_or_else(|e| {
        tracing::warn!(metric, error = %e, "Admin count failed, reporting zero");
        0
    })
}

fn buckets_or_empty(
    metric: &'static str,
    result: Result<Vec<StatusCount>, sqlx::Error>,
) -> BTreeMap<String, i64> {
    match result {
        Ok(rows) => rows.into_iter().map(|r| (r.status, r.count)).collect(),
        Err(e) => {
            tracing::warn!(metric, error = %e, "Admin breakdown failed, reporting empty");
            BTreeMap::new()
        }
    }
}

fn rows_or_empty<T>(listing: &'static str, result: Result<Vec<T>, sqlx::Error>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(listing, error = %e, "Admin listing failed, reporting empty");
        Vec::new()
    })
}

/// GET /api/v1/admin/stats
pub async fn stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<SuccessResponse<AdminStats>> {
    let pool = &state.pool;

    let (users, orgs, presentations, dubbings, audit_events, by_status, dub_by_status) =
        tokio::join!(
            UserProfileRepo::count(pool),
            OrgRepo::count(pool),
            PresentationMirrorRepo::count(pool),
            DubbingMirrorRepo::count(pool),
            AuditLogRepo::count(pool),
            PresentationMirrorRepo::count_by_status(pool),
            DubbingMirrorRepo::count_by_status(pool),
        );

    let stats = AdminStats {
        users: count_or_zero("users", users),
        orgs: count_or_zero("orgs", orgs),
        presentations: count_or_zero("presentations", presentations),
        dubbings: count_or_zero("dubbings", dubbings),
        audit_events: count_or_zero("audit_events", audit_events),
        presentations_by_status: buckets_or_empty("presentations_by_status", by_status),
        dubbings_by_status: buckets_or_empty("dubbings_by_status", dub_by_status),
        generated_at: chrono::Utc::now(),
    };

    tracing::debug!(admin = %admin.user_id, users = stats.users, "Admin stats served");
    Json(SuccessResponse::ok(stats))
}

/// GET /api/v1/admin/presentations?limit&offset&status
pub async fn list_presentations(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<StatusListParams>,
) -> Json<SuccessResponse<Vec<PresentationMirror>>> {
    let query = MirrorListQuery {
        user_id: None,
        status: params.status.filter(|s| !s.is_empty()),
        limit: params.limit,
        offset: params.offset,
    };
    let rows = PresentationMirrorRepo::list(&state.pool, &query).await;
    Json(SuccessResponse::ok(rows_or_empty("presentations", rows)))
}

/// GET /api/v1/admin/users?limit&offset
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Json<SuccessResponse<Vec<UserProfile>>> {
    let rows = UserProfileRepo::list(&state.pool, params.limit, params.offset).await;
    Json(SuccessResponse::ok(rows_or_empty("users", rows)))
}

/// GET /api/v1/admin/audit?limit&offset&action
pub async fn list_audit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditListParams>,
) -> Json<SuccessResponse<Vec<AuditLog>>> {
    let action = params.action.as_deref().filter(|a| !a.is_empty());
    let rows = AuditLogRepo::list_recent(&state.pool, action, params.limit, params.offset).await;
    Json(SuccessResponse::ok(rows_or_empty("audit", rows)))
}
