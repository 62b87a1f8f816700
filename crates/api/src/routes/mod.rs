pub mod admin;
pub mod dashboard;
pub mod health;
pub mod site;
pub mod workbench;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /locales                                   locale registry (GET)
///
/// /admin/stats                               site-wide counters (GET)
/// /admin/presentations                       presentation mirrors (GET)
/// /admin/users                               user profiles (GET)
/// /admin/audit                               audit log (GET)
///
/// /workbench/slides                          submit slides job (POST)
/// /workbench/jobs/{job_id}/artifacts         job artifacts (GET)
/// /workbench/uploads                         forward upload (POST, multipart)
/// /workbench/dubbing                         submit dubbing job (POST)
///
/// /dashboard/presentations                   own presentations (GET)
/// /dashboard/presentations/{plan_id}/sync    refresh mirror (POST)
/// /dashboard/dubbing                         own dubbing jobs (GET)
/// /dashboard/dubbing/{job_id}/sync           refresh mirror (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/locales", get(handlers::locales::list_locales))
        // Admin aggregation (admin role enforced by extractor).
        .nest("/admin", admin::router())
        // Kernel proxy routes.
        .nest("/workbench", workbench::router())
        // Per-user mirror views and explicit sync.
        .nest("/dashboard", dashboard::router())
}
