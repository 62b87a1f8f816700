use sqlx::PgPool;

/// Every `id` column must be bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table has timestamptz `created_at`; all but the audit log have `updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_tables_have_timestamps(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table,) in &tables {
        let cols: &[&str] = if table == "audit_logs" {
            &["created_at"]
        } else {
            &["created_at", "updated_at"]
        };
        for col in cols {
            let result: Option<(String,)> = sqlx::query_as(&format!(
                "SELECT data_type
                 FROM information_schema.columns
                 WHERE table_schema = 'public'
                   AND table_name = '{table}'
                   AND column_name = '{col}'"
            ))
            .fetch_optional(&pool)
            .await
            .unwrap();

            let (data_type,) =
                result.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(
                data_type, "timestamp with time zone",
                "Table {table}.{col} should be timestamptz, got {data_type}"
            );
        }
    }
}

/// No varchar columns; text only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "varchar columns found: {rows:?}");
}

/// Tables with `updated_at` carry the trigger that maintains it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_triggers_exist(pool: PgPool) {
    for table in [
        "orgs",
        "user_profiles",
        "org_members",
        "presentation_mirrors",
        "dubbing_mirrors",
    ] {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)::BIGINT
             FROM information_schema.triggers
             WHERE event_object_table::TEXT = $1
               AND trigger_name::TEXT = $2",
        )
        .bind(table)
        .bind(format!("trg_{table}_updated_at"))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(count > 0, "Table {table} is missing its updated_at trigger");
    }
}
