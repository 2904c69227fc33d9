//! HTTP-level integration tests for the day-to-day manager workflow:
//! reports, checklists, the recharge calendar, and the dashboard.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_client, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth,
    register,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_summary_carries_computed_metrics(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;
    let client_id = create_client(app.clone(), &owner.token, "Padaria").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/reports",
        json!({
            "client_id": client_id,
            "title": "Março",
            "period_start": "2026-03-01",
            "period_end": "2026-03-31",
            "investment": 1000.0,
            "revenue": 3000.0,
            "impressions": 10000,
            "clicks": 200,
            "conversions": 20,
        }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report = body_json(response).await;
    assert_eq!(report["data"]["author_id"], owner.user_id);
    let id = report["data"]["id"].as_i64().unwrap();

    let summary = body_json(
        get_auth(app, &format!("/api/v1/reports/{id}/summary"), &owner.token).await,
    )
    .await;
    assert_eq!(summary["data"]["client_name"], "Padaria");

    let metrics = summary["data"]["metrics"].as_array().unwrap();
    let kinds: Vec<&str> = metrics.iter().map(|m| m["kind"].as_str().unwrap()).collect();
    // No leads, so no CPL.
    assert!(!kinds.contains(&"cpl"));
    let roas = metrics.iter().find(|m| m["kind"] == "roas").unwrap();
    assert_eq!(roas["formatted"], "3.00x");
    assert_eq!(roas["rating"], "good");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_validation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;
    let client_id = create_client(app.clone(), &owner.token, "Padaria").await;

    let inverted = post_json_auth(
        app.clone(),
        "/api/v1/reports",
        json!({
            "client_id": client_id,
            "title": "Errado",
            "period_start": "2026-03-31",
            "period_end": "2026-03-01",
        }),
        &owner.token,
    )
    .await;
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);

    let negative = post_json_auth(
        app.clone(),
        "/api/v1/reports",
        json!({
            "client_id": client_id,
            "title": "Errado",
            "period_start": "2026-03-01",
            "period_end": "2026-03-31",
            "investment": -5.0,
        }),
        &owner.token,
    )
    .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let unknown_client = post_json_auth(
        app,
        "/api/v1/reports",
        json!({
            "client_id": client_id + 1000,
            "title": "Errado",
            "period_start": "2026-03-01",
            "period_end": "2026-03-31",
        }),
        &owner.token,
    )
    .await;
    assert_eq!(unknown_client.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn report_update_validates_the_merged_period(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;
    let client_id = create_client(app.clone(), &owner.token, "Padaria").await;

    let created = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/reports",
            json!({
                "client_id": client_id,
                "title": "Março",
                "period_start": "2026-03-01",
                "period_end": "2026-03-31",
            }),
            &owner.token,
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/reports/{id}"),
        json!({ "period_start": "2026-04-15" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/reports/{id}"),
        json!({ "revenue": 4200.0 }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["revenue"], 4200.0);

    let response = delete_auth(app, &format!("/api/v1/reports/{id}"), &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn template_checklist_tracks_progress(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/checklists",
        json!({ "title": "Onboarding Padaria", "template": "onboarding" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail = body_json(response).await;
    let id = detail["data"]["checklist"]["id"].as_i64().unwrap();
    let items = detail["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(detail["data"]["progress"]["percent"], 0);

    let item_id = items[0]["id"].as_i64().unwrap();
    let toggled = body_json(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/checklists/{id}/items/{item_id}"),
            json!({ "is_done": true }),
            &owner.token,
        )
        .await,
    )
    .await;
    assert_eq!(toggled["data"]["is_done"], true);
    assert_eq!(toggled["data"]["done_by"], owner.user_id);
    assert!(toggled["data"]["done_at"].is_string());

    let detail = body_json(get_auth(app.clone(), &format!("/api/v1/checklists/{id}"), &owner.token).await).await;
    assert_eq!(detail["data"]["progress"]["done"], 1);
    assert_eq!(detail["data"]["progress"]["percent"], 20);

    // Unchecking clears the stamp.
    let untoggled = body_json(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/checklists/{id}/items/{item_id}"),
            json!({ "is_done": false }),
            &owner.token,
        )
        .await,
    )
    .await;
    assert!(untoggled["data"]["done_at"].is_null());
    assert!(untoggled["data"]["done_by"].is_null());

    let overview = body_json(get_auth(app, "/api/v1/checklists", &owner.token).await).await;
    assert_eq!(overview["data"][0]["items_total"], 5);
    assert_eq!(overview["data"][0]["items_done"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_template_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;

    let response = post_json_auth(
        app,
        "/api/v1/checklists",
        json!({ "title": "X", "template": "nope" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checklist_items_can_be_added_and_removed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;
    let other = register(app.clone(), "Outra", "x@example.com").await;

    let detail = body_json(
        post_json_auth(app.clone(), "/api/v1/checklists", json!({ "title": "Solta" }), &owner.token).await,
    )
    .await;
    let id = detail["data"]["checklist"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/checklists/{id}/items"),
        json!({ "label": "Enviar proposta" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Another agency can neither add to nor delete from it.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/checklists/{id}/items"),
        json!({ "label": "Intruso" }),
        &other.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/checklists/{id}/items/{item_id}"),
        &other.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(
        app,
        &format!("/api/v1/checklists/{id}/items/{item_id}"),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Recharges and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn recharge_calendar_and_dashboard(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;
    let client_id = create_client(app.clone(), &owner.token, "Padaria").await;

    let today = Utc::now().date_naive();
    let soon = today + Duration::days(2);
    let later = today + Duration::days(30);

    let soon_id = {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/recharges",
            json!({ "client_id": client_id, "amount": 500.0, "due_date": soon }),
            &owner.token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"]["id"].as_i64().unwrap()
    };
    post_json_auth(
        app.clone(),
        "/api/v1/recharges",
        json!({ "client_id": client_id, "amount": 800.0, "due_date": later, "platform": "tiktok" }),
        &owner.token,
    )
    .await;

    let bad_amount = post_json_auth(
        app.clone(),
        "/api/v1/recharges",
        json!({ "client_id": client_id, "amount": 0.0, "due_date": soon }),
        &owner.token,
    )
    .await;
    assert_eq!(bad_amount.status(), StatusCode::BAD_REQUEST);

    let window = body_json(
        get_auth(
            app.clone(),
            &format!("/api/v1/recharges?from={today}&to={}", today + Duration::days(7)),
            &owner.token,
        )
        .await,
    )
    .await;
    assert_eq!(window["data"].as_array().unwrap().len(), 1);

    post_json_auth(
        app.clone(),
        "/api/v1/reports",
        json!({
            "client_id": client_id,
            "title": "Semana",
            "period_start": today - Duration::days(6),
            "period_end": today,
            "investment": 200.0,
            "revenue": 900.0,
        }),
        &owner.token,
    )
    .await;

    let dash = body_json(get_auth(app.clone(), "/api/v1/dashboard/summary", &owner.token).await).await;
    assert_eq!(dash["data"]["clients"]["active"], 1);
    assert_eq!(dash["data"]["reports_this_month"], 1);
    assert_eq!(dash["data"]["investment_30d"], 200.0);
    assert_eq!(dash["data"]["roas_30d"], 4.5);
    assert_eq!(dash["data"]["recharges_due"], 1);

    let done = body_json(
        post_auth(app.clone(), &format!("/api/v1/recharges/{soon_id}/complete"), &owner.token).await,
    )
    .await;
    assert_eq!(done["data"]["status"], "done");
    assert!(done["data"]["completed_at"].is_string());

    let dash = body_json(get_auth(app, "/api/v1/dashboard/summary", &owner.token).await).await;
    assert_eq!(dash["data"]["recharges_due"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_of_an_empty_agency(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "o@example.com").await;

    let dash = body_json(get_auth(app, "/api/v1/dashboard/summary", &owner.token).await).await;
    assert_eq!(dash["data"]["clients"]["active"], 0);
    assert_eq!(dash["data"]["reports_this_month"], 0);
    assert!(dash["data"]["roas_30d"].is_null());
    assert_eq!(dash["data"]["open_checklist_items"], 0);
}
