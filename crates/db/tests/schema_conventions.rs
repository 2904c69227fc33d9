use sqlx::PgPool;

/// All `id` columns must be bigint.
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

/// Every `updated_at` column is timestamptz and kept current by a trigger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_columns_have_triggers(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE table_schema = 'public' AND column_name = 'updated_at'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table, data_type) in &rows {
        assert_eq!(
            data_type, "timestamp with time zone",
            "Table {table}.updated_at should be timestamptz, got {data_type}"
        );

        let triggers: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.triggers
             WHERE event_object_table = $1 AND trigger_name = 'set_updated_at'",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(triggers.0 > 0, "Table {table} is missing the set_updated_at trigger");
    }
}

/// Check constraints are named `ck_<table>_<column>` so violations map to 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_constraints_are_named(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT rel.relname::TEXT, con.conname::TEXT
         FROM pg_constraint con
         JOIN pg_class rel ON rel.oid = con.conrelid
         JOIN pg_namespace ns ON ns.oid = rel.relnamespace
         WHERE con.contype = 'c' AND ns.nspname = 'public'
         ORDER BY 1, 2",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    let unnamed: Vec<_> = rows
        .iter()
        .filter(|(table, name)| !name.starts_with(&format!("ck_{table}_")))
        .collect();
    assert!(unnamed.is_empty(), "Check constraints without a ck_ name: {unnamed:?}");
}

/// No character varying columns should exist; TEXT is preferred.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name, column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found varchar columns: {rows:?}");
}

/// Money columns are stored as double precision, never numeric or real.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_money_columns_are_double(pool: PgPool) {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name, column_name, data_type
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND column_name IN ('investment', 'revenue', 'amount', 'monthly_budget')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 4);
    for (table, column, data_type) in &rows {
        assert_eq!(
            data_type, "double precision",
            "{table}.{column} should be double precision"
        );
    }
}
