//! HTTP-level integration tests for registration, login, token refresh,
//! lockout, and agency manager administration.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, get_auth, post_auth, post_json, post_json_auth, put_json_auth, register, register_with,
    send, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(app: axum::Router, email: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_agency_owner_and_free_plan(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = register_with(app.clone(), "Agência Tráfego", "Dona@Example.com", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["role"], "owner");
    assert_eq!(json["user"]["email"], "dona@example.com");

    let token = json["access_token"].as_str().unwrap();
    let agency = body_json(get_auth(app.clone(), "/api/v1/agency", token).await).await;
    assert_eq!(agency["data"]["slug"], "agencia-trafego");

    let sub = body_json(get_auth(app, "/api/v1/billing/subscription", token).await).await;
    assert_eq!(sub["data"]["plan"], "free");
    assert_eq!(sub["data"]["effective_plan"], "free");
    assert_eq!(sub["data"]["client_limit"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_409(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "Primeira", "dup@example.com").await;

    let response = register_with(app, "Segunda", "DUP@example.com", None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_agency_name_gets_a_distinct_slug(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "Acme", "a@example.com").await;
    let second = register(app.clone(), "Acme", "b@example.com").await;

    let agency = body_json(get_auth(app, "/api/v1/agency", &second.token).await).await;
    assert_eq!(agency["data"]["slug"], "acme-2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "agency_name": "Acme",
            "name": "Ana",
            "email": "ana@example.com",
            "password": "short",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_and_me(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "owner@example.com").await;

    let response = login(app.clone(), "owner@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["access_token"].as_str().unwrap();

    let me = body_json(get_auth(app, "/api/v1/auth/me", token).await).await;
    assert_eq!(me["data"]["id"], owner.user_id);
    assert!(me["data"]["last_login_at"].is_string());
    assert!(me["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_is_401_and_locks_after_five(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "Acme", "lock@example.com").await;

    for _ in 0..5 {
        let response = login(app.clone(), "lock@example.com", "wrong-password-1").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = login(app, "lock@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_tokens_are_single_use(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = register_with(app.clone(), "Acme", "r@example.com", None).await;
    let refresh_token = body_json(response).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let first = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let replay = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_records_client_address_on_refresh_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.clone(), "Acme", "ip@example.com").await;
    sqlx::query("DELETE FROM refresh_tokens").execute(&pool).await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .header("user-agent", "vurp-test")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(
            json!({ "email": "ip@example.com", "password": TEST_PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (agent, ip): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT user_agent, ip_address FROM refresh_tokens")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(agent.as_deref(), Some("vurp-test"));
    assert_eq!(ip.as_deref(), Some("203.0.113.7"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_outstanding_refresh_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(register_with(app.clone(), "Acme", "out@example.com", None).await).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_auth(app.clone(), "/api/v1/auth/logout", &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_manages_gestores(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "boss@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/agency/managers",
        json!({ "name": "Gestor Um", "email": "g1@example.com", "password": "gestor-pass-1" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let manager = body_json(response).await;
    assert_eq!(manager["data"]["role"], "gestor");
    let manager_id = manager["data"]["id"].as_i64().unwrap();

    // The gestor can log in but cannot administer the agency.
    let gestor = body_json(login(app.clone(), "g1@example.com", "gestor-pass-1").await).await;
    let gestor_token = gestor["access_token"].as_str().unwrap();
    let forbidden = put_json_auth(
        app.clone(),
        "/api/v1/agency",
        json!({ "name": "Hijacked" }),
        gestor_token,
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let listed = body_json(get_auth(app.clone(), "/api/v1/agency/managers", &owner.token).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);

    // Deactivated gestores can no longer log in.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/agency/managers/{manager_id}"),
        json!({ "is_active": false }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = login(app, "g1@example.com", "gestor-pass-1").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_cannot_deactivate_themselves(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(app.clone(), "Acme", "self@example.com").await;

    let response = put_json_auth(
        app,
        &format!("/api/v1/agency/managers/{}", owner.user_id),
        json!({ "is_active": false }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_with_referral_code_records_the_referral(pool: PgPool) {
    let app = common::build_test_app(pool);
    let referrer = register(app.clone(), "Indicadora", "ref@example.com").await;

    let code = referrer.referral_code.to_lowercase();
    let response = register_with(app.clone(), "Indicada", "new@example.com", Some(&code)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let summary = body_json(get_auth(app, "/api/v1/referrals/summary", &referrer.token).await).await;
    assert_eq!(summary["data"]["referral_code"], referrer.referral_code);
    assert_eq!(summary["data"]["total"], 1);
    assert_eq!(summary["data"]["signed_up"], 1);
    assert_eq!(summary["data"]["converted"], 0);
    assert_eq!(summary["data"]["next_reward_in"], 3);
}
