//! Tests for the background mirror sync pass.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sharayeh_api::background::mirror_sync::{self, SyncSummary};
use sharayeh_db::models::presentation::UpsertPresentationMirror;
use sharayeh_db::repositories::PresentationMirrorRepo;
use sharayeh_kernel::api::KernelApi;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn seed(pool: &PgPool, plan_id: &str, status: &str) {
    PresentationMirrorRepo::upsert(
        pool,
        &UpsertPresentationMirror {
            plan_id: plan_id.to_string(),
            status: status.to_string(),
            ..UpsertPresentationMirror::default()
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_once_refreshes_only_non_terminal_rows(pool: PgPool) {
    seed(&pool, "plan-queued", "queued").await;
    seed(&pool, "plan-running", "running").await;
    seed(&pool, "plan-done", "completed").await;

    let server = MockServer::start().await;
    for plan_id in ["plan-queued", "plan-running"] {
        Mock::given(method("GET"))
            .and(path(format!("/v1/presentations/{plan_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plan_id": plan_id,
                "status": "completed",
                "pptx_url": format!("https://cdn.test/{plan_id}.pptx")
            })))
            .expect(1)
            .mount(&server)
            .await;
    }
    // A completed row must not be fetched again.
    Mock::given(method("GET"))
        .and(path("/v1/presentations/plan-done"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let kernel = KernelApi::new(server.uri(), None);
    let summary = mirror_sync::sync_once(&pool, &kernel).await;

    assert_eq!(summary, SyncSummary { synced: 2, failed: 0 });
    let row = PresentationMirrorRepo::find_by_plan_id(&pool, "plan-running")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "completed");
    assert_eq!(row.pptx_url.as_deref(), Some("https://cdn.test/plan-running.pptx"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_failing_row_does_not_stop_the_pass(pool: PgPool) {
    seed(&pool, "plan-bad", "running").await;
    seed(&pool, "plan-good", "running").await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/presentations/plan-bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/presentations/plan-good"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "plan_id": "plan-good", "status": "failed" })),
        )
        .mount(&server)
        .await;

    let kernel = KernelApi::new(server.uri(), None);
    let summary = mirror_sync::sync_once(&pool, &kernel).await;

    assert_eq!(summary, SyncSummary { synced: 1, failed: 1 });
    let bad = PresentationMirrorRepo::find_by_plan_id(&pool, "plan-bad")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bad.status, "running");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn run_stops_when_cancelled(pool: PgPool) {
    let kernel = Arc::new(KernelApi::new("http://127.0.0.1:1", None));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(mirror_sync::run(
        pool,
        kernel,
        Duration::from_millis(10),
        cancel.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("sync loop exits after cancel")
        .expect("sync loop does not panic");
}
