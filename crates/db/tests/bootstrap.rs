use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    vurp_db::health_check(&pool).await.unwrap();

    let tables = [
        "agencies",
        "users",
        "refresh_tokens",
        "clients",
        "reports",
        "checklists",
        "checklist_items",
        "recharges",
        "user_achievements",
        "usage_sessions",
        "error_reports",
        "referrals",
        "subscriptions",
        "stripe_webhook_events",
        "blog_posts",
        "blog_post_likes",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
