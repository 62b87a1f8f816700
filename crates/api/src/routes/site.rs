//! Locale-prefixed page routes, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::site;
use crate::state::AppState;

/// ```text
/// GET    /{locale}           -> locale_home
/// GET    /{locale}/{*path}   -> locale_page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{locale}", get(site::locale_home))
        .route("/{locale}/{*path}", get(site::locale_page))
}
