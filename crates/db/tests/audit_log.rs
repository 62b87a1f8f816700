//! The audit log accepts inserts and rejects every other mutation.

use serde_json::json;
use sqlx::PgPool;
use sharayeh_db::models::audit::{actions, CreateAuditLog};
use sharayeh_db::repositories::AuditLogRepo;

fn entry(action: &str) -> CreateAuditLog {
    CreateAuditLog {
        actor_id: Some("user_1".to_string()),
        action: action.to_string(),
        entity_type: Some("presentation".to_string()),
        entity_id: Some("p-1".to_string()),
        details_json: json!({"slides_count": 8}),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_and_list_newest_first(pool: PgPool) {
    AuditLogRepo::insert(&pool, &entry(actions::SLIDES_JOB_CREATED)).await.unwrap();
    let second = AuditLogRepo::insert(&pool, &entry(actions::MIRROR_SYNCED)).await.unwrap();

    let all = AuditLogRepo::list_recent(&pool, None, None, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].details_json["slides_count"], 8);

    let synced = AuditLogRepo::list_recent(&pool, Some(actions::MIRROR_SYNCED), None, None)
        .await
        .unwrap();
    assert_eq!(synced.len(), 1);
    assert_eq!(AuditLogRepo::count(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_is_rejected(pool: PgPool) {
    let row = AuditLogRepo::insert(&pool, &entry(actions::SLIDES_JOB_CREATED)).await.unwrap();

    let err = sqlx::query("UPDATE audit_logs SET action = 'tampered' WHERE id = $1")
        .bind(row.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("append-only"), "unexpected error: {err}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_is_rejected(pool: PgPool) {
    let row = AuditLogRepo::insert(&pool, &entry(actions::UPLOAD_FORWARDED)).await.unwrap();

    let result = sqlx::query("DELETE FROM audit_logs WHERE id = $1")
        .bind(row.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
    assert_eq!(AuditLogRepo::count(&pool).await.unwrap(), 1);
}
