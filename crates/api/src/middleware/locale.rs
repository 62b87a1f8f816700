//! Locale Router middleware.
//!
//! Page requests without a locale prefix are redirected (307) to the
//! prefixed form, choosing the locale from the cookie, then
//! `Accept-Language`, then the default. Prefixed requests pass through and
//! the cookie is refreshed to match the path. API, health and static asset
//! paths are never touched.

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sharayeh_core::locale::{resolve_redirect, Locale, RedirectDecision};

use crate::state::AppState;

/// Cookie lifetime: one year.
const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

pub async fn redirect_to_locale(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.site.locale_cookie.as_str();
    let cookie_locale = cookie_value(request.headers(), cookie_name);
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let decision = resolve_redirect(
        request.uri().path(),
        request.uri().query(),
        cookie_locale.as_deref(),
        accept_language,
    );

    match decision {
        RedirectDecision::Bypass => next.run(request).await,
        RedirectDecision::Pass { locale } => {
            let refresh = cookie_locale.as_deref() != Some(locale.code());
            let mut response = next.run(request).await;
            if refresh {
                append_locale_cookie(&mut response, cookie_name, locale);
            }
            response
        }
        RedirectDecision::Redirect { locale, location } => {
            tracing::debug!(%location, locale = %locale, "Redirecting to locale prefix");
            let mut response = match HeaderValue::from_str(&location) {
                Ok(value) => {
                    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, value)]).into_response()
                }
                Err(_) => return StatusCode::BAD_REQUEST.into_response(),
            };
            append_locale_cookie(&mut response, cookie_name, locale);
            response
        }
    }
}

/// Read a cookie from every `Cookie` header. The first match wins.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn append_locale_cookie(response: &mut Response, name: &str, locale: Locale) {
    let cookie = format!(
        "{name}={}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax",
        locale.code()
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Invalid locale cookie name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        map
    }

    #[test]
    fn reads_named_cookie() {
        let map = headers("theme=dark; NEXT_LOCALE=ar; other=1");
        assert_eq!(cookie_value(&map, "NEXT_LOCALE").as_deref(), Some("ar"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        assert!(cookie_value(&headers("theme=dark"), "NEXT_LOCALE").is_none());
        assert!(cookie_value(&headers("NEXT_LOCALE="), "NEXT_LOCALE").is_none());
        assert!(cookie_value(&HeaderMap::new(), "NEXT_LOCALE").is_none());
    }

    #[test]
    fn name_must_match_exactly() {
        let map = headers("XNEXT_LOCALE=fr");
        assert!(cookie_value(&map, "NEXT_LOCALE").is_none());
    }
}
