//! Per-user dashboard over the mirror tables.
//!
//! Listings read only the local copies. The sync endpoints are the explicit
//! refresh call: they fetch the kernel's view and overwrite the mirror.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::json;
use sharayeh_db::models::audit::actions;
use sharayeh_db::models::dubbing::DubbingMirror;
use sharayeh_db::models::presentation::PresentationMirror;
use sharayeh_db::repositories::{
    DubbingMirrorRepo, MirrorListQuery, PresentationMirrorRepo, UserProfileRepo,
};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::mirror;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn list_query(
    state: &AppState,
    user: &AuthUser,
    params: PaginationParams,
) -> AppResult<Option<MirrorListQuery>> {
    let profile = UserProfileRepo::find_by_external_id(&state.pool, &user.user_id).await?;
    Ok(profile.map(|p| MirrorListQuery {
        user_id: Some(p.id),
        status: None,
        limit: params.limit,
        offset: params.offset,
    }))
}

/// GET /api/v1/dashboard/presentations
pub async fn list_presentations(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PresentationMirror>>>> {
    let data = match list_query(&state, &user, params).await? {
        Some(query) => PresentationMirrorRepo::list(&state.pool, &query).await?,
        None => Vec::new(),
    };
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/dubbing
pub async fn list_dubbing(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<DubbingMirror>>>> {
    let data = match list_query(&state, &user, params).await? {
        Some(query) => DubbingMirrorRepo::list(&state.pool, &query).await?,
        None => Vec::new(),
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/dashboard/presentations/{plan_id}/sync
pub async fn sync_presentation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> AppResult<Json<DataResponse<PresentationMirror>>> {
    let existing = PresentationMirrorRepo::find_by_plan_id(&state.pool, &plan_id).await?;
    mirror::ensure_owner(&state.pool, &user, existing.and_then(|m| m.user_id)).await?;

    let synced = mirror::sync_presentation(&state.pool, &state.kernel, &plan_id).await?;

    mirror::audit(
        &state.pool,
        Some(&user.user_id),
        actions::MIRROR_SYNCED,
        "presentation",
        &plan_id,
        json!({ "status": synced.status }),
    )
    .await;

    Ok(Json(DataResponse { data: synced }))
}

/// POST /api/v1/dashboard/dubbing/{job_id}/sync
pub async fn sync_dubbing(
    user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<DataResponse<DubbingMirror>>> {
    let existing = DubbingMirrorRepo::find_by_job_id(&state.pool, &job_id).await?;
    mirror::ensure_owner(&state.pool, &user, existing.and_then(|m| m.user_id)).await?;

    let synced = mirror::sync_dubbing(&state.pool, &state.kernel, &job_id).await?;

    mirror::audit(
        &state.pool,
        Some(&user.user_id),
        actions::MIRROR_SYNCED,
        "dubbing",
        &job_id,
        json!({ "status": synced.status }),
    )
    .await;

    Ok(Json(DataResponse { data: synced }))
}
