//! Integration tests for pymk-rec API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints (no session required)
//! - Session middleware (bearer header, cookie, unknown and expired tokens)
//! - Recommendation response shape and limit clamping
//! - Generic 500 on store failure

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use helpers::Fixture;
use pymk_common::config::ServiceConfig;
use pymk_common::db::{insert_post, Post};
use pymk_common::session::{create_session, insert_session};
use pymk_rec::{build_router, AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app over the fixture's store
fn setup_app(fx: &Fixture) -> axum::Router {
    let state = AppState::new(fx.pool.clone(), ServiceConfig::default());
    build_router(state)
}

/// Test helper: GET request with optional bearer token
fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: requester "r" with a live session
async fn signed_in(fx: &Fixture) -> String {
    let r = fx.user("r").await;
    create_session(&fx.pool, &r, pymk_common::time::now())
        .await
        .expect("Should create session")
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let fx = Fixture::new().await;
    let app = setup_app(&fx);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], pymk_rec::SERVICE_NAME);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let fx = Fixture::new().await;
    let app = setup_app(&fx);

    let response = app.oneshot(get("/api/buildinfo", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
    let built_at = body["build_timestamp"].as_str().expect("Should be a string");
    assert!(chrono::DateTime::parse_from_rfc3339(built_at).is_ok());
    assert!(built_at.ends_with('Z'));
}

// =============================================================================
// Session middleware
// =============================================================================

#[tokio::test]
async fn test_recommendations_require_session() {
    let fx = Fixture::new().await;
    let app = setup_app(&fx);

    let response = app.oneshot(get("/api/recommendations", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let fx = Fixture::new().await;
    let app = setup_app(&fx);

    let response = app
        .oneshot(get("/api/recommendations", Some("not-a-session")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let fx = Fixture::new().await;
    let r = fx.user("r").await;
    let expired_at = pymk_common::time::now() - Duration::minutes(1);
    insert_session(&fx.pool, "old-token", &r, expired_at).await.unwrap();

    let app = setup_app(&fx);
    let response = app
        .oneshot(get("/api/recommendations", Some("old-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let fx = Fixture::new().await;
    let token = signed_in(&fx).await;
    let app = setup_app(&fx);

    let request = Request::builder()
        .method("GET")
        .uri("/api/recommendations")
        .header(header::COOKIE, format!("session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_recommendations_response_shape() {
    let fx = Fixture::new().await;
    let token = signed_in(&fx).await;
    let x = fx.user("x").await;
    for m in fx.users("m", 3).await {
        fx.follow("r", &m).await;
        fx.follow(&m, &x).await;
    }
    fx.old_post(&x).await;

    let app = setup_app(&fx);
    let response = app
        .oneshot(get("/api/recommendations?limit=5", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let recs = body["recommendations"].as_array().expect("Should be array");
    assert_eq!(recs.len(), 1);

    let rec = &recs[0];
    assert_eq!(rec["score"], 6.0);
    assert_eq!(rec["reason"], "3 mutual connections");
    assert_eq!(rec["user"]["id"], "x");
    assert_eq!(rec["user"]["username"], "x");
    assert_eq!(rec["user"]["displayName"], "x Display");
    assert!(rec["user"]["avatarUrl"].is_null());
    assert!(rec["user"]["createdAt"].is_string());
    assert_eq!(rec["user"]["_count"]["followers"], 3);
    assert_eq!(rec["user"]["_count"]["posts"], 1);
}

#[tokio::test]
async fn test_empty_recommendations_are_ok() {
    let fx = Fixture::new().await;
    let token = signed_in(&fx).await;

    let app = setup_app(&fx);
    let response = app
        .oneshot(get("/api/recommendations", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let fx = Fixture::new().await;
    let token = signed_in(&fx).await;

    // 60 recently active users, more than the maximum limit. The handler
    // evaluates against the real clock, so posts are dated from it too.
    let posted_at = pymk_common::time::now() - Duration::hours(2);
    for user in fx.users("active", 60).await {
        insert_post(&fx.pool, &Post::new(&user, "hi", posted_at)).await.unwrap();
    }
    let app = setup_app(&fx);

    let cases = [
        ("/api/recommendations?limit=500", 50),
        ("/api/recommendations?limit=2", 2),
        ("/api/recommendations?limit=0", 1),
        ("/api/recommendations?limit=abc", 10),
        ("/api/recommendations?limit=5abc", 5),
        ("/api/recommendations?limit=3.9", 3),
        ("/api/recommendations", 10),
    ];

    for (uri, expected) in cases {
        let response = app.clone().oneshot(get(uri, Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = extract_json(response.into_body()).await;
        let recs = body["recommendations"].as_array().unwrap();
        assert_eq!(recs.len(), expected, "{}", uri);
    }
}

#[tokio::test]
async fn test_store_failure_returns_generic_500() {
    let fx = Fixture::new().await;
    let token = signed_in(&fx).await;
    let app = setup_app(&fx);

    fx.pool.close().await;

    let response = app
        .oneshot(get("/api/recommendations", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Internal server error");
}
