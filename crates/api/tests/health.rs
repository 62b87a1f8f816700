//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, unreachable_pool};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn health_check_reports_degraded_database() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/locales").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // MakeRequestUuid produces a hyphenated UUID.
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn locale_registry_lists_direction_and_default() {
    let app = build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/locales").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let arabic = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["code"] == "ar")
        .expect("arabic is registered")
        .clone();
    assert_eq!(arabic["dir"], "rtl");
    assert_eq!(arabic["is_default"], false);
    assert_eq!(json["data"][0]["is_default"], true);
}
