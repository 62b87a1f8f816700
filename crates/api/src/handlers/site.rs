//! Page-shell descriptors for locale-prefixed page routes.
//!
//! These are the targets of the locale redirect. Only the metadata a page
//! shell needs is returned: the locale, its writing direction and the
//! canonical URL.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use sharayeh_core::error::CoreError;
use sharayeh_core::locale::{Locale, LocaleInfo, TextDirection};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PageShell {
    pub locale: Locale,
    pub dir: TextDirection,
    pub native_name: &'static str,
    /// Path below the locale prefix, always starting with `/`.
    pub path: String,
    pub canonical_url: String,
}

fn supported(code: &str) -> AppResult<&'static LocaleInfo> {
    Locale::all()
        .iter()
        .find(|info| info.code == code)
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Page",
                key: format!("/{code}"),
            }
            .into()
        })
}

fn shell(site_url: &str, info: &'static LocaleInfo, rest: &str) -> PageShell {
    let rest = rest.trim_matches('/');
    let path = format!("/{rest}");
    let canonical_url = if rest.is_empty() {
        format!("{}/{}", site_url.trim_end_matches('/'), info.code)
    } else {
        format!("{}/{}/{rest}", site_url.trim_end_matches('/'), info.code)
    };
    PageShell {
        locale: info.locale,
        dir: info.dir,
        native_name: info.native_name,
        path,
        canonical_url,
    }
}

/// GET /{locale}
pub async fn locale_home(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> AppResult<Json<DataResponse<PageShell>>> {
    let info = supported(&locale)?;
    Ok(Json(DataResponse {
        data: shell(&state.config.site.site_url, info, ""),
    }))
}

/// GET /{locale}/{*path}
pub async fn locale_page(
    State(state): State<AppState>,
    Path((locale, path)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<PageShell>>> {
    let info = supported(&locale)?;
    Ok(Json(DataResponse {
        data: shell(&state.config.site.site_url, info, &path),
    }))
}
