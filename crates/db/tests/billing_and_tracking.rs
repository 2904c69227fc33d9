//! Integration tests for subscription mirroring, referrals, usage sessions,
//! achievements, blog counters and refresh-token rotation.

use sqlx::PgPool;
use vurp_core::billing::{Plan, SubscriptionStatus};
use vurp_core::types::DbId;
use vurp_core::usage_tracking::MAX_SESSION_SECS;
use vurp_db::models::blog::CreateBlogPost;
use vurp_db::models::refresh_token::IssueRefreshToken;
use vurp_db::models::subscription::UpsertSubscription;
use vurp_db::models::user::CreateUser;
use vurp_db::repositories::{
    AchievementRepo, AgencyRepo, BlogRepo, ReferralRepo, RefreshTokenRepo, SubscriptionRepo,
    UsageSessionRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create an agency with its owner and free subscription. Returns
/// `(agency_id, owner_id)`.
async fn new_agency(pool: &PgPool, slug: &str, referred_by: Option<DbId>) -> (DbId, DbId) {
    let email = format!("{slug}@example.com");
    let mut tx = pool.begin().await.unwrap();
    let agency = AgencyRepo::create_in_tx(&mut tx, slug, slug).await.unwrap();
    let owner = UserRepo::create_in_tx(
        &mut tx,
        &CreateUser {
            agency_id: agency.id,
            name: "Owner".to_string(),
            email: email.clone(),
            password_hash: "hash".to_string(),
            role: "owner".to_string(),
            referral_code: slug.to_uppercase(),
            referred_by_user_id: referred_by,
        },
    )
    .await
    .unwrap();
    SubscriptionRepo::create_free_in_tx(&mut tx, agency.id)
        .await
        .unwrap();
    if let Some(referrer) = referred_by {
        ReferralRepo::record_signup_in_tx(&mut tx, referrer, &email, owner.id)
            .await
            .unwrap();
    }
    tx.commit().await.unwrap();
    (agency.id, owner.id)
}

fn paid(agency_id: DbId, plan: Option<Plan>) -> UpsertSubscription {
    UpsertSubscription {
        agency_id,
        stripe_customer_id: Some("cus_1".to_string()),
        stripe_subscription_id: Some("sub_1".to_string()),
        plan,
        status: SubscriptionStatus::Active,
        current_period_end: None,
        cancel_at_period_end: None,
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_agencies_start_free(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme", None).await;
    let sub = SubscriptionRepo::find_by_agency(&pool, agency).await.unwrap().unwrap();
    assert_eq!(sub.plan, "free");
    assert_eq!(sub.status, "active");
    assert!(sub.stripe_customer_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_keeps_known_fields(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme", None).await;
    SubscriptionRepo::upsert(&pool, &paid(agency, Some(Plan::Pro)))
        .await
        .unwrap();

    // A later event without a plan or customer leaves both in place.
    let later = UpsertSubscription {
        stripe_customer_id: None,
        plan: None,
        status: SubscriptionStatus::PastDue,
        ..paid(agency, None)
    };
    let sub = SubscriptionRepo::upsert(&pool, &later).await.unwrap();
    assert_eq!(sub.plan, "pro");
    assert_eq!(sub.status, "past_due");
    assert_eq!(sub.stripe_customer_id.as_deref(), Some("cus_1"));

    let found = SubscriptionRepo::find_by_customer(&pool, "cus_1").await.unwrap().unwrap();
    assert_eq!(found.agency_id, agency);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn canceled_subscription_falls_back_to_free(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme", None).await;
    SubscriptionRepo::upsert(&pool, &paid(agency, Some(Plan::Starter)))
        .await
        .unwrap();

    let sub = SubscriptionRepo::cancel_by_stripe_id(&pool, "sub_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sub.plan, "free");
    assert_eq!(sub.status, "canceled");
    assert!(sub.stripe_subscription_id.is_none());
    assert!(SubscriptionRepo::cancel_by_stripe_id(&pool, "sub_1")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhook_events_are_recorded_once(pool: PgPool) {
    assert!(SubscriptionRepo::record_webhook_event(&pool, "evt_1", "checkout.session.completed")
        .await
        .unwrap());
    assert!(!SubscriptionRepo::record_webhook_event(&pool, "evt_1", "checkout.session.completed")
        .await
        .unwrap());

    SubscriptionRepo::forget_webhook_event(&pool, "evt_1").await.unwrap();
    assert!(SubscriptionRepo::record_webhook_event(&pool, "evt_1", "checkout.session.completed")
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Referrals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn invited_referral_moves_through_signup_and_conversion(pool: PgPool) {
    let (_, referrer) = new_agency(&pool, "acme", None).await;
    ReferralRepo::create(&pool, referrer, " Beta@Example.com ").await.unwrap();

    let counts = ReferralRepo::counts(&pool, referrer).await.unwrap();
    assert_eq!((counts.total, counts.signed_up, counts.converted), (1, 0, 0));

    let (referred_agency, _) = new_agency(&pool, "beta", Some(referrer)).await;
    let counts = ReferralRepo::counts(&pool, referrer).await.unwrap();
    assert_eq!((counts.total, counts.signed_up, counts.converted), (1, 1, 0));

    assert_eq!(ReferralRepo::convert_for_agency(&pool, referred_agency).await.unwrap(), 1);
    // Already converted.
    assert_eq!(ReferralRepo::convert_for_agency(&pool, referred_agency).await.unwrap(), 0);

    let counts = ReferralRepo::counts(&pool, referrer).await.unwrap();
    assert_eq!((counts.total, counts.signed_up, counts.converted), (1, 0, 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_invite_violates_unique_constraint(pool: PgPool) {
    let (_, referrer) = new_agency(&pool, "acme", None).await;
    ReferralRepo::create(&pool, referrer, "x@example.com").await.unwrap();

    let err = ReferralRepo::create(&pool, referrer, "X@example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_referrals_referrer_email")
    );
}

// ---------------------------------------------------------------------------
// Usage sessions and achievements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_duration_is_monotonic_and_capped(pool: PgPool) {
    let (_, user) = new_agency(&pool, "acme", None).await;
    let session = UsageSessionRepo::start(&pool, user, Some("test-agent")).await.unwrap();
    assert_eq!(session.duration_secs, 0);

    let s = UsageSessionRepo::update_duration(&pool, user, session.id, 90).await.unwrap().unwrap();
    assert_eq!(s.duration_secs, 90);
    let s = UsageSessionRepo::update_duration(&pool, user, session.id, 30).await.unwrap().unwrap();
    assert_eq!(s.duration_secs, 90);
    let s = UsageSessionRepo::update_duration(&pool, user, session.id, MAX_SESSION_SECS * 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s.duration_secs, MAX_SESSION_SECS);

    assert!(UsageSessionRepo::end(&pool, user, session.id, 0).await.unwrap());
    assert!(!UsageSessionRepo::end(&pool, user, session.id, 0).await.unwrap());

    let stats = UsageSessionRepo::stats(&pool, user, Some(7)).await.unwrap();
    assert_eq!(stats.session_count, 1);
    assert_eq!(stats.total_secs, MAX_SESSION_SECS);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_sessions_are_closed(pool: PgPool) {
    let (_, user) = new_agency(&pool, "acme", None).await;
    let stale = UsageSessionRepo::start(&pool, user, None).await.unwrap();
    let fresh = UsageSessionRepo::start(&pool, user, None).await.unwrap();
    sqlx::query("UPDATE usage_sessions SET last_seen_at = NOW() - INTERVAL '2 hours' WHERE id = $1")
        .bind(stale.id)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(UsageSessionRepo::close_stale(&pool, 30).await.unwrap(), 1);
    assert!(UsageSessionRepo::update_duration(&pool, user, stale.id, 10)
        .await
        .unwrap()
        .is_none());
    assert!(UsageSessionRepo::update_duration(&pool, user, fresh.id, 10)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn achievement_unlocks_are_unique(pool: PgPool) {
    let (_, user) = new_agency(&pool, "acme", None).await;
    AchievementRepo::insert(&pool, user, "first_client").await.unwrap();

    let err = AchievementRepo::insert(&pool, user, "first_client").await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_user_achievements_user_key")
    );

    let session = UsageSessionRepo::start(&pool, user, None).await.unwrap();
    UsageSessionRepo::update_duration(&pool, user, session.id, 120).await.unwrap();
    let counters = AchievementRepo::counters(&pool, user).await.unwrap();
    assert_eq!(counters.usage_seconds, 120);
    assert_eq!(counters.reports_authored, 0);
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn like_toggle_keeps_counter_in_step(pool: PgPool) {
    let input = CreateBlogPost {
        title: "ROAS".to_string(),
        slug: None,
        excerpt: None,
        content: String::new(),
        author_name: None,
        cover_url: None,
        published_at: Some(chrono::Utc::now() - chrono::Duration::hours(1)),
    };
    BlogRepo::create(&pool, "roas", &input).await.unwrap();

    let liked = BlogRepo::toggle_like(&pool, "roas", "v1").await.unwrap().unwrap();
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);
    let unliked = BlogRepo::toggle_like(&pool, "roas", "v1").await.unwrap().unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);

    assert!(BlogRepo::toggle_like(&pool, "missing", "v1").await.unwrap().is_none());
    assert_eq!(BlogRepo::increment_view(&pool, "roas").await.unwrap(), Some(1));
}

// ---------------------------------------------------------------------------
// Refresh tokens
// ---------------------------------------------------------------------------

fn token(user_id: DbId, hash: &str, expires_in: chrono::Duration) -> IssueRefreshToken<'_> {
    IssueRefreshToken {
        user_id,
        token_hash: hash,
        expires_at: chrono::Utc::now() + expires_in,
        user_agent: Some("test-agent"),
        ip_address: Some("203.0.113.7"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_token_is_consumed_once(pool: PgPool) {
    let (_, user) = new_agency(&pool, "rt", None).await;
    let issued = RefreshTokenRepo::issue(&pool, &token(user, "h1", chrono::Duration::days(30)))
        .await
        .unwrap();
    assert!(issued.is_live(chrono::Utc::now()));
    assert_eq!(issued.ip_address.as_deref(), Some("203.0.113.7"));

    let consumed = RefreshTokenRepo::consume(&pool, "h1").await.unwrap().unwrap();
    assert_eq!(consumed.user_id, user);
    assert!(consumed.consumed_at.is_some());
    assert!(RefreshTokenRepo::consume(&pool, "h1").await.unwrap().is_none());
    assert!(RefreshTokenRepo::consume(&pool, "unknown").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_and_revoked_tokens_are_refused(pool: PgPool) {
    let (_, user) = new_agency(&pool, "rt2", None).await;
    RefreshTokenRepo::issue(&pool, &token(user, "old", -chrono::Duration::minutes(1)))
        .await
        .unwrap();
    RefreshTokenRepo::issue(&pool, &token(user, "a", chrono::Duration::days(1)))
        .await
        .unwrap();
    RefreshTokenRepo::issue(&pool, &token(user, "b", chrono::Duration::days(1)))
        .await
        .unwrap();

    assert!(RefreshTokenRepo::consume(&pool, "old").await.unwrap().is_none());
    assert_eq!(RefreshTokenRepo::revoke_all_for_user(&pool, user).await.unwrap(), 2);
    assert!(RefreshTokenRepo::consume(&pool, "a").await.unwrap().is_none());
    assert_eq!(RefreshTokenRepo::revoke_all_for_user(&pool, user).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn purge_keeps_recent_rows(pool: PgPool) {
    let (_, user) = new_agency(&pool, "rt3", None).await;
    RefreshTokenRepo::issue(&pool, &token(user, "ancient", -chrono::Duration::days(30)))
        .await
        .unwrap();
    RefreshTokenRepo::issue(&pool, &token(user, "live", chrono::Duration::days(30)))
        .await
        .unwrap();
    RefreshTokenRepo::consume(&pool, "live").await.unwrap();

    assert_eq!(RefreshTokenRepo::purge_dead(&pool, 7).await.unwrap(), 1);
    assert_eq!(RefreshTokenRepo::purge_dead(&pool, 7).await.unwrap(), 0);
}
