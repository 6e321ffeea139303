//! Router-level tests against the in-memory store.

use std::{sync::Arc, time::Duration};

use assign_server::{
    AppState,
    assignment::sampling::{RandomSource, ScriptedRandom},
    build_router,
    store::InMemoryStore,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(random: impl RandomSource + 'static) -> Router {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), store, Arc::new(random));
    build_router(state, Duration::from_secs(5))
}

fn app() -> Router {
    app_with(ScriptedRandom::new([0, 0]))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn seed_team(app: &Router) {
    let (status, _) = post(
        app,
        "/team/add",
        json!({
            "team_name": "T",
            "members": [
                {"user_id": "u1", "username": "Alice", "is_active": true},
                {"user_id": "u2", "username": "Bob", "is_active": true},
                {"user_id": "u3", "username": "Carol", "is_active": true},
                {"user_id": "u4", "username": "Dave", "is_active": true}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_health_carries_version_and_request_id() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-server-version"));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_team_add_and_get() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = get(&app, "/team/get?team_name=T").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "T");
    assert_eq!(body["members"].as_array().unwrap().len(), 4);
    assert_eq!(body["members"][0]["user_id"], "u1");
    assert_eq!(body["members"][0]["username"], "Alice");

    let (status, body) = post(&app, "/team/add", json!({"team_name": "T", "members": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = get(&app, "/team/get?team_name=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "P1", "pull_request_name": "Add search", "author_id": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["status"], "OPEN");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["u3", "u4"]));
    assert!(body["pr"]["createdAt"].is_string());
    assert!(body["pr"].get("mergedAt").is_none());
    assert!(body["pr"].get("version").is_none());

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "P1", "old_user_id": "u3"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], "u2");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["u2", "u4"]));

    let (status, body) = get(&app, "/users/getReview?user_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u2");
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "P1");

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "P1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["mergedAt"].clone();
    assert!(merged_at.is_string());

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "P1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["mergedAt"], merged_at);

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "P1", "old_user_id": "u2"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pr"], 1);
    assert_eq!(body["open_pr"], 0);
    assert_eq!(body["merged_pr"], 1);
    assert_eq!(
        body["reviews_per_user"],
        json!([
            {"user_id": "u2", "reviews_count": 1},
            {"user_id": "u4", "reviews_count": 1}
        ])
    );
}

#[tokio::test]
async fn test_pull_request_errors() {
    let app = app();
    seed_team(&app).await;

    let create = json!({"pull_request_id": "P1", "pull_request_name": "Fix", "author_id": "u1"});
    let (status, _) = post(&app, "/pullRequest/create", create.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&app, "/pullRequest/create", create).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "P2", "pull_request_name": "Fix", "author_id": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "P3", "author_id": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "pull_request_name is required");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "P1", "old_user_id": "u2"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NOT_ASSIGNED");

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let request = Request::post("/pullRequest/merge")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid json");
}

#[tokio::test]
async fn test_reassign_without_candidate() {
    let app = app();
    let (status, _) = post(
        &app,
        "/team/add",
        json!({
            "team_name": "small",
            "members": [
                {"user_id": "a", "username": "A", "is_active": true},
                {"user_id": "b", "username": "B", "is_active": true}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "P1", "pull_request_name": "Fix", "author_id": "a"}),
    )
    .await;
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["b"]));

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "P1", "old_user_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NO_CANDIDATE");
}

#[tokio::test]
async fn test_set_is_active_shrinks_pool() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "u2", "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_active"], false);
    assert_eq!(body["user"]["team_name"], "T");

    let (_, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "P1", "pull_request_name": "Fix", "author_id": "u1"}),
    )
    .await;
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["u3", "u4"]));

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "ghost", "is_active": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = get(&app, "/users/getReview?user_id=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}
