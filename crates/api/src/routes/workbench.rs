//! Route definitions for the `/workbench` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workbench;
use crate::state::AppState;

/// Routes mounted at `/workbench`.
///
/// ```text
/// POST   /slides                    -> create_slides
/// GET    /jobs/{job_id}/artifacts   -> job_artifacts
/// POST   /uploads                   -> upload
/// POST   /dubbing                   -> create_dubbing
/// ```
///
/// The upload route lifts axum's default body limit; the handler enforces
/// the configured `MAX_UPLOAD_MB` itself.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slides", post(workbench::create_slides))
        .route("/jobs/{job_id}/artifacts", get(workbench::job_artifacts))
        .route(
            "/uploads",
            post(workbench::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/dubbing", post(workbench::create_dubbing))
}
