//! Integration tests for agency-scoped repositories.
//!
//! Every tenant-scoped query takes the caller's `agency_id`; these tests
//! verify another agency's rows are never returned or modified, and that
//! the soft-delete and counter conventions hold.

use chrono::NaiveDate;
use sqlx::PgPool;
use vurp_core::types::DbId;
use vurp_db::models::checklist::{ChecklistListParams, CreateChecklist, UpdateChecklistItem};
use vurp_db::models::client::{ClientListParams, CreateClient, UpdateClient};
use vurp_db::models::recharge::CreateRecharge;
use vurp_db::models::report::CreateReport;
use vurp_db::models::user::CreateUser;
use vurp_db::repositories::{
    AgencyRepo, ChecklistRepo, ClientRepo, DashboardRepo, RechargeRepo, ReportRepo,
    SubscriptionRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create an agency with its owner and free subscription. Returns
/// `(agency_id, owner_id)`.
async fn new_agency(pool: &PgPool, slug: &str) -> (DbId, DbId) {
    let mut tx = pool.begin().await.unwrap();
    let agency = AgencyRepo::create_in_tx(&mut tx, slug, slug).await.unwrap();
    let owner = UserRepo::create_in_tx(
        &mut tx,
        &CreateUser {
            agency_id: agency.id,
            name: "Owner".to_string(),
            email: format!("{slug}@example.com"),
            password_hash: "hash".to_string(),
            role: "owner".to_string(),
            referral_code: slug.to_uppercase(),
            referred_by_user_id: None,
        },
    )
    .await
    .unwrap();
    SubscriptionRepo::create_free_in_tx(&mut tx, agency.id)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    (agency.id, owner.id)
}

fn new_client(name: &str) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        manager_id: None,
        company: None,
        email: None,
        phone: None,
        platform: None,
        status: None,
        monthly_budget: None,
        notes: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_report(client_id: DbId, end: NaiveDate) -> CreateReport {
    CreateReport {
        client_id,
        title: "Relatório".to_string(),
        period_start: end - chrono::Duration::days(6),
        period_end: end,
        investment: 100.0,
        revenue: 250.0,
        impressions: 1_000,
        clicks: 50,
        leads: 5,
        conversions: 2,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_defaults_and_trim(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme").await;

    let client = ClientRepo::create(&pool, agency, &new_client("  Padaria  "))
        .await
        .unwrap();
    assert_eq!(client.name, "Padaria");
    assert_eq!(client.platform, "meta");
    assert_eq!(client.status, "active");
    assert_eq!(client.monthly_budget, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clients_are_invisible_across_agencies(pool: PgPool) {
    let (a, _) = new_agency(&pool, "acme").await;
    let (b, _) = new_agency(&pool, "beta").await;
    let client = ClientRepo::create(&pool, a, &new_client("Padaria")).await.unwrap();

    assert!(ClientRepo::find_by_id(&pool, b, client.id).await.unwrap().is_none());
    assert!(!ClientRepo::soft_delete(&pool, b, client.id).await.unwrap());

    let update = UpdateClient {
        name: Some("Invadido".to_string()),
        manager_id: None,
        company: None,
        email: None,
        phone: None,
        platform: None,
        status: None,
        monthly_budget: None,
        notes: None,
    };
    assert!(ClientRepo::update(&pool, b, client.id, &update).await.unwrap().is_none());

    let params = ClientListParams {
        status: None,
        manager_id: None,
        search: None,
        limit: None,
        offset: None,
    };
    let listed = ClientRepo::list(&pool, b, &params, None, 50, 0).await.unwrap();
    assert!(listed.is_empty());
}

async fn active_clients(pool: &PgPool, agency: DbId) -> i64 {
    let mut tx = pool.begin().await.unwrap();
    let count = ClientRepo::count_active_locked(&mut tx, agency).await.unwrap();
    tx.rollback().await.unwrap();
    count
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_count_waits_for_pending_insert(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme").await;

    let mut first = pool.begin().await.unwrap();
    assert_eq!(ClientRepo::count_active_locked(&mut first, agency).await.unwrap(), 0);

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { active_clients(&pool, agency).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!waiter.is_finished());

    ClientRepo::create_in_tx(&mut first, agency, &new_client("Padaria"))
        .await
        .unwrap();
    first.commit().await.unwrap();

    assert_eq!(waiter.await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_hides_client_and_is_idempotent(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme").await;
    let client = ClientRepo::create(&pool, agency, &new_client("Padaria")).await.unwrap();
    assert_eq!(active_clients(&pool, agency).await, 1);

    assert!(ClientRepo::soft_delete(&pool, agency, client.id).await.unwrap());
    assert!(!ClientRepo::soft_delete(&pool, agency, client.id).await.unwrap());
    assert!(ClientRepo::find_by_id(&pool, agency, client.id).await.unwrap().is_none());
    assert_eq!(active_clients(&pool, agency).await, 0);

    // Historical reports still resolve the name.
    let name = ReportRepo::client_name(&pool, agency, client.id).await.unwrap();
    assert_eq!(name.as_deref(), Some("Padaria"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_client_status_is_rejected_by_schema(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme").await;
    let mut input = new_client("Padaria");
    input.status = Some("archived".to_string());

    let err = ClientRepo::create(&pool, agency, &input).await.unwrap_err();
    assert!(err.as_database_error().is_some());
}

// ---------------------------------------------------------------------------
// Reports and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn inverted_report_period_violates_check(pool: PgPool) {
    let (agency, owner) = new_agency(&pool, "acme").await;
    let client = ClientRepo::create(&pool, agency, &new_client("Padaria")).await.unwrap();

    let mut input = new_report(client.id, date(2026, 3, 31));
    input.period_start = date(2026, 4, 10);
    let err = ReportRepo::create(&pool, agency, owner, &input).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("ck_reports_period"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_totals_respect_the_window(pool: PgPool) {
    let (agency, owner) = new_agency(&pool, "acme").await;
    let (other, other_owner) = new_agency(&pool, "beta").await;
    let client = ClientRepo::create(&pool, agency, &new_client("Padaria")).await.unwrap();
    let foreign = ClientRepo::create(&pool, other, &new_client("Mercado")).await.unwrap();

    ReportRepo::create(&pool, agency, owner, &new_report(client.id, date(2026, 3, 31)))
        .await
        .unwrap();
    ReportRepo::create(&pool, agency, owner, &new_report(client.id, date(2026, 2, 28)))
        .await
        .unwrap();
    ReportRepo::create(&pool, other, other_owner, &new_report(foreign.id, date(2026, 3, 31)))
        .await
        .unwrap();

    let totals = DashboardRepo::report_totals(&pool, agency, date(2026, 3, 1))
        .await
        .unwrap();
    assert_eq!(totals.report_count, 1);
    assert_eq!(totals.investment, 100.0);
    assert_eq!(totals.revenue, 250.0);

    let empty = DashboardRepo::report_totals(&pool, agency, date(2027, 1, 1))
        .await
        .unwrap();
    assert_eq!(empty.report_count, 0);
    assert_eq!(empty.investment, 0.0);
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn checklist_items_stamp_completion(pool: PgPool) {
    let (agency, owner) = new_agency(&pool, "acme").await;
    let (other, other_owner) = new_agency(&pool, "beta").await;

    let input = CreateChecklist {
        title: "Lançamento".to_string(),
        client_id: None,
        template: None,
    };
    let checklist = ChecklistRepo::create_with_items(&pool, agency, owner, &input, &["A", "B"])
        .await
        .unwrap();
    let items = ChecklistRepo::list_items(&pool, agency, checklist.id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "A");
    assert!(items.iter().all(|i| !i.is_done));

    let done = UpdateChecklistItem {
        label: None,
        is_done: Some(true),
        sort_order: None,
    };
    // Another agency cannot tick it.
    assert!(
        ChecklistRepo::update_item(&pool, other, checklist.id, items[0].id, other_owner, &done)
            .await
            .unwrap()
            .is_none()
    );

    let item = ChecklistRepo::update_item(&pool, agency, checklist.id, items[0].id, owner, &done)
        .await
        .unwrap()
        .unwrap();
    assert!(item.is_done);
    assert_eq!(item.done_by, Some(owner));
    let stamped_at = item.done_at.unwrap();

    // Re-marking done keeps the original stamp.
    let again = ChecklistRepo::update_item(&pool, agency, checklist.id, items[0].id, owner, &done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.done_at, Some(stamped_at));

    assert_eq!(DashboardRepo::open_checklist_items(&pool, agency).await.unwrap(), 1);

    let overview = ChecklistRepo::list_overview(
        &pool,
        agency,
        &ChecklistListParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].items_total, 2);
    assert_eq!(overview[0].items_done, 1);

    // Deleting the checklist cascades to its items.
    assert!(ChecklistRepo::delete(&pool, agency, checklist.id).await.unwrap());
    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM checklist_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 0);
}

// ---------------------------------------------------------------------------
// Recharges
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_a_recharge_is_idempotent(pool: PgPool) {
    let (agency, _) = new_agency(&pool, "acme").await;
    let client = ClientRepo::create(&pool, agency, &new_client("Padaria")).await.unwrap();

    let recharge = RechargeRepo::create(
        &pool,
        agency,
        &CreateRecharge {
            client_id: client.id,
            platform: None,
            amount: 300.0,
            due_date: date(2026, 3, 10),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(recharge.status, "scheduled");
    assert_eq!(recharge.platform, "meta");
    assert_eq!(RechargeRepo::count_due(&pool, agency, date(2026, 3, 10)).await.unwrap(), 1);
    assert_eq!(RechargeRepo::count_due(&pool, agency, date(2026, 3, 9)).await.unwrap(), 0);

    let first = RechargeRepo::complete(&pool, agency, recharge.id).await.unwrap().unwrap();
    let second = RechargeRepo::complete(&pool, agency, recharge.id).await.unwrap().unwrap();
    assert_eq!(first.status, "done");
    assert_eq!(first.completed_at, second.completed_at);
    assert_eq!(RechargeRepo::count_due(&pool, agency, date(2026, 12, 31)).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Login lockout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn fifth_failure_locks_and_restarts_the_count(pool: PgPool) {
    let (_, owner) = new_agency(&pool, "lockout").await;

    for _ in 0..4 {
        assert!(!UserRepo::record_failed_login(&pool, owner, 5, 15).await.unwrap());
    }
    assert!(UserRepo::record_failed_login(&pool, owner, 5, 15).await.unwrap());

    let user = UserRepo::find_by_id(&pool, owner).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.unwrap() > chrono::Utc::now());

    UserRepo::record_successful_login(&pool, owner).await.unwrap();
    let user = UserRepo::find_by_id(&pool, owner).await.unwrap().unwrap();
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}
