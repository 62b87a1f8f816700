//! Integration tests for the locale redirect middleware and page shells.
//!
//! None of these touch the database, so the app is built on a pool that
//! never connects.

mod common;

use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_with_headers, unreachable_pool};

fn set_cookie(response: &axum::http::Response<axum::body::Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Redirects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_with_arabic_accept_language_redirects_to_ar() {
    let app = build_test_app(unreachable_pool());
    let response = get_with_headers(app, "/", &[("accept-language", "ar")]).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/ar");
    let cookie = set_cookie(&response).expect("redirect sets the locale cookie");
    assert!(cookie.starts_with("NEXT_LOCALE=ar;"), "got {cookie}");
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn root_without_hints_redirects_to_default() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/en");
}

#[tokio::test]
async fn cookie_takes_precedence_over_accept_language() {
    let app = build_test_app(unreachable_pool());
    let response = get_with_headers(
        app,
        "/dashboard",
        &[("cookie", "theme=dark; NEXT_LOCALE=fr"), ("accept-language", "ar")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/fr/dashboard");
}

#[tokio::test]
async fn unsupported_cookie_falls_back_to_accept_language() {
    let app = build_test_app(unreachable_pool());
    let response = get_with_headers(
        app,
        "/pricing",
        &[("cookie", "NEXT_LOCALE=de"), ("accept-language", "de-DE, es;q=0.8")],
    )
    .await;

    assert_eq!(response.headers()[LOCATION], "/es/pricing");
}

#[tokio::test]
async fn redirect_preserves_query_string() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/workbench/slides?template=pitch&step=2").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[LOCATION],
        "/en/workbench/slides?template=pitch&step=2"
    );
}

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prefixed_path_is_not_redirected() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/en/dashboard").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());

    let json = body_json(response).await;
    assert_eq!(json["data"]["locale"], "en");
    assert_eq!(json["data"]["dir"], "ltr");
    assert_eq!(json["data"]["path"], "/dashboard");
    assert_eq!(
        json["data"]["canonical_url"],
        "https://sharayeh.test/en/dashboard"
    );
}

#[tokio::test]
async fn prefixed_path_with_matching_cookie_sets_no_cookie() {
    let app = build_test_app(unreachable_pool());
    let response = get_with_headers(app, "/ar", &[("cookie", "NEXT_LOCALE=ar")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());

    let json = body_json(response).await;
    assert_eq!(json["data"]["dir"], "rtl");
    assert_eq!(json["data"]["native_name"], "العربية");
}

#[tokio::test]
async fn prefixed_path_overrides_a_mismatching_cookie() {
    let app = build_test_app(unreachable_pool());
    let response =
        get_with_headers(app, "/es/dashboard", &[("cookie", "NEXT_LOCALE=ar")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response).expect("cookie refreshed to the path locale");
    assert!(cookie.starts_with("NEXT_LOCALE=es;"), "got {cookie}");
}

// ---------------------------------------------------------------------------
// Bypass
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_routes_are_never_redirected() {
    let app = build_test_app(unreachable_pool());
    let response =
        get_with_headers(app, "/api/v1/locales", &[("accept-language", "ar")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());

    let json = body_json(response).await;
    let codes: Vec<_> = json["data"]
        .as_array()
        .expect("data is an array")
        .iter()
        .map(|l| l["code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes, ["en", "ar", "es", "fr"]);
}

#[tokio::test]
async fn unknown_api_route_is_404_not_redirect() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_asset_is_not_redirected() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/favicon.ico").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(LOCATION).is_none());
}
