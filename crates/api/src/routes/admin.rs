//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /stats           -> stats
/// GET    /presentations   -> list_presentations
/// GET    /users           -> list_users
/// GET    /audit           -> list_audit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/presentations", get(admin::list_presentations))
        .route("/users", get(admin::list_users))
        .route("/audit", get(admin::list_audit))
}
