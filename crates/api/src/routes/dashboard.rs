//! Route definitions for the `/dashboard` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET    /presentations                  -> list_presentations
/// POST   /presentations/{plan_id}/sync   -> sync_presentation
/// GET    /dubbing                        -> list_dubbing
/// POST   /dubbing/{job_id}/sync          -> sync_dubbing
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presentations", get(dashboard::list_presentations))
        .route(
            "/presentations/{plan_id}/sync",
            post(dashboard::sync_presentation),
        )
        .route("/dubbing", get(dashboard::list_dubbing))
        .route("/dubbing/{job_id}/sync", post(dashboard::sync_dubbing))
}
