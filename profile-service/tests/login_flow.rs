mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use chrono::Utc;
use common_auth::{ROLE_ADMIN, ROLE_USER};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use profile_service::authenticator::HttpAuthenticator;
use profile_service::role_store::RoleStore;
use profile_service::router;
use serde_json::{json, Value};
use support::{build_state, token_service, TestDatabase};
use tower::util::ServiceExt;

const SECRET: &str = "login-flow-test-secret";

fn unique_username(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix}-{nanos}")
}

async fn delete_assignment(store: &RoleStore, username: &str) -> Result<()> {
    sqlx::query("DELETE FROM user_roles WHERE username = $1")
        .bind(username)
        .execute(store.pool())
        .await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn login_provisions_and_persists_role() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();
    let store = RoleStore::new(pool.clone());

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auth/api/users");
        then.status(200);
    });

    let tokens = token_service(SECRET);
    let authenticator =
        HttpAuthenticator::new(server.url("/auth/api/users"), Duration::from_secs(10))?;
    let state = build_state(pool, tokens.clone(), Arc::new(authenticator));
    let app = router(state);

    let username = unique_username("alice");
    assert_eq!(store.get_role(&username).await?, None);

    let login_body = json!({"username": username, "password": "correct-horse"});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(login_body.to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;

    assert_eq!(body["token_type"], json!("bearer"));
    assert_eq!(body["username"], json!(username.clone()));
    let role = body["role"].as_str().expect("role in response").to_string();
    assert_eq!(role, ROLE_USER);

    // The token's embedded role matches the persisted assignment.
    let access_token = body["access_token"].as_str().expect("token in response");
    let claims = tokens.verify(access_token)?;
    assert_eq!(claims.subject, username);
    assert_eq!(claims.role, role);
    assert_eq!(store.get_role(&username).await?, Some(role.clone()));

    // A second login keeps the first assignment.
    let again = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(login_body.to_string()))?,
        )
        .await?;
    assert_eq!(again.status(), StatusCode::OK);
    let again_bytes = again.into_body().collect().await?.to_bytes();
    let again_body: Value = serde_json::from_slice(&again_bytes)?;
    assert_eq!(again_body["role"], json!(role.clone()));

    // Admin-gated lookup sees the assignment.
    let admin_token = tokens.issue("root", ROLE_ADMIN)?;
    let lookup = app
        .oneshot(
            Request::builder()
                .uri(format!("/auth/role/{username}"))
                .header(AUTHORIZATION, format!("Bearer {}", admin_token.access_token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(lookup.status(), StatusCode::OK);
    let lookup_bytes = lookup.into_body().collect().await?.to_bytes();
    let lookup_body: Value = serde_json::from_slice(&lookup_bytes)?;
    assert_eq!(lookup_body["role"], json!(role));

    delete_assignment(&store, &username).await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_writes_no_assignment() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let pool = db.pool_clone();
    let store = RoleStore::new(pool.clone());

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auth/api/users");
        then.status(401);
    });

    let authenticator =
        HttpAuthenticator::new(server.url("/auth/api/users"), Duration::from_secs(10))?;
    let state = build_state(pool, token_service(SECRET), Arc::new(authenticator));

    let username = unique_username("mallory");
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"username": username, "password": "wrong"}).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.get_role(&username).await?, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn ensure_role_is_idempotent_and_race_safe() -> Result<()> {
    let Some(db) = TestDatabase::setup().await? else {
        return Ok(());
    };
    let store = RoleStore::new(db.pool_clone());

    let username = unique_username("carol");

    // Concurrent first calls converge on a single persisted role.
    let (first, second) = tokio::join!(store.ensure_role(&username), store.ensure_role(&username));
    let first = first?;
    assert_eq!(first, second?);
    assert_eq!(store.get_role(&username).await?, Some(first.clone()));

    // Subsequent calls keep returning the same role.
    assert_eq!(store.ensure_role(&username).await?, first);

    // An explicit upsert overrides the assignment; ensure_role then respects it.
    store.set_role(&username, ROLE_ADMIN).await?;
    assert_eq!(store.get_role(&username).await?, Some(ROLE_ADMIN.to_string()));
    assert_eq!(store.ensure_role(&username).await?, ROLE_ADMIN);

    delete_assignment(&store, &username).await?;
    Ok(())
}
