//! End-to-end checks of the HTTP surface against an in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use studystream_core::{
    clock::FixedClock, config::StudyConfig, store::StudyStore, ServiceOptions, StudyService,
};
use studystream_server::{config::Environment, router, state::AppState};
use tower::ServiceExt;

fn app() -> Router {
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
    let service = StudyService::build_test(Box::new(clock)).expect("build test service");
    router(AppState::new(service, Environment::Development))
}

/// A service whose database was never migrated: every query fails.
fn broken_app(environment: Environment) -> Router {
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
    let service = StudyService::with_clock(
        StudyStore::in_memory().unwrap(),
        StudyConfig::builtin().unwrap(),
        ServiceOptions::default(),
        Box::new(clock),
    );
    router(AppState::new(service, environment))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Register a learner; returns (token, user id).
async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": "secret",
            "gradeLevel": "10th Grade",
            "subjects": ["Mathematics", "Science"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "StudyStream API is running");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
    assert_eq!(body["message"], "Cannot GET /api/nope");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let (token, user_id) = register(&app, "ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"username": "ada", "password": "x", "gradeLevel": "9th", "subjects": ["History"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"username": "bob", "password": "x", "gradeLevel": "9th", "subjects": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "All fields are required and at least one subject must be selected"
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"username": "ada", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"username": "ada", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);
    assert_eq!(body["user"]["gradeLevel"], "10th Grade");
    assert_eq!(body["user"]["totalPoints"], 0);
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_with_null_fields_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"username": null, "password": "x", "gradeLevel": "9th", "subjects": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "All fields are required and at least one subject must be selected"
    );
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({"username": "ada"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");
}

#[tokio::test]
async fn protected_routes_check_the_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");

    let (token, _) = register(&app, "ada").await;
    let (_, other) = register(&app, "grace").await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/achievements/{other}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn content_listing_filters_and_recommends() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/content", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 6);

    let (_, body) = send(&app, Method::GET, "/api/content?subject=Mathematics", None, None).await;
    let items = body["content"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "intro-to-algebra");

    let (status, _) = send(&app, Method::GET, "/api/content?difficulty=impossible", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/content/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Content not found");

    let (token, user_id) = register(&app, "ada").await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/content/recommendations/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let subjects: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["subject"].as_str().unwrap())
        .collect();
    assert_eq!(subjects.len(), 2);
    assert!(subjects.iter().all(|s| *s == "Mathematics" || *s == "Science"));
}

#[tokio::test]
async fn progress_awards_completion_points_once() {
    let app = app();
    let (token, user_id) = register(&app, "ada").await;
    let uri = "/api/content/intro-to-algebra/progress";

    let (status, body) = send(&app, Method::POST, uri, Some(&token), Some(json!({"userId": user_id}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID and progress percentage are required");

    let (status, body) = send(
        &app,
        Method::POST,
        uri,
        Some(&token),
        Some(json!({"userId": user_id, "progressPercentage": 100, "timeSpent": 12, "completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Progress recorded successfully");
    assert_eq!(body["completed"], true);
    assert_eq!(body["pointsAwarded"], 50);
    assert_eq!(body["currentStreak"], 1);

    let (_, body) = send(
        &app,
        Method::POST,
        uri,
        Some(&token),
        Some(json!({"userId": user_id, "progressPercentage": 100, "completed": true})),
    )
    .await;
    assert_eq!(body["message"], "Progress updated successfully");
    assert_eq!(body["pointsAwarded"], 0);

    let (_, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(body["user"]["totalPoints"], 50);

    let (status, body) = send(&app, Method::GET, &format!("/api/progress/{user_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"][0]["title"], "Introduction to Algebra");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/users/{user_id}/activity?limit=50"),
        Some(&token),
        None,
    )
    .await;
    let kinds: Vec<&str> = body["activity"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"content_completed"));
    assert!(kinds.contains(&"user_registered"));
}

#[tokio::test]
async fn progress_for_someone_else_is_forbidden() {
    let app = app();
    let (token, _) = register(&app, "ada").await;
    let (_, other) = register(&app, "grace").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/content/intro-to-algebra/progress",
        Some(&token),
        Some(json!({"userId": other, "progressPercentage": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn goal_lifecycle() {
    let app = app();
    let (token, user_id) = register(&app, "ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/goals",
        Some(&token),
        Some(json!({"userId": user_id, "title": "Read"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/goals",
        Some(&token),
        Some(json!({
            "userId": user_id,
            "title": "Finish two lessons",
            "description": "this week",
            "targetValue": 2,
            "goalType": "weekly",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Goal created successfully");
    let goal_id = body["goal"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, Method::GET, &format!("/api/goals/{user_id}?type=weekly"), Some(&token), None).await;
    assert_eq!(body["goals"].as_array().unwrap().len(), 1);
    let (_, body) = send(&app, Method::GET, &format!("/api/goals/{user_id}?type=daily"), Some(&token), None).await;
    assert!(body["goals"].as_array().unwrap().is_empty());

    let goal_uri = format!("/api/goals/{goal_id}");
    let (status, body) = send(&app, Method::PUT, &goal_uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Current value is required");

    let (status, body) = send(&app, Method::PUT, &goal_uri, Some(&token), Some(json!({"currentValue": 2, "completed": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Goal updated successfully");
    assert_eq!(body["goal"]["completed"], true);

    let (_, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(body["user"]["totalPoints"], 25);

    let (status, body) = send(&app, Method::DELETE, &goal_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Goal deleted successfully");

    let (status, body) = send(&app, Method::DELETE, &goal_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Goal not found");
}

#[tokio::test]
async fn goals_of_other_users_cannot_be_changed() {
    let app = app();
    let (owner_token, owner) = register(&app, "ada").await;
    let (intruder_token, _) = register(&app, "grace").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/goals",
        Some(&owner_token),
        Some(json!({"userId": owner, "title": "Quiz", "targetValue": 1, "goalType": "daily"})),
    )
    .await;
    let goal_uri = format!("/api/goals/{}", body["goal"]["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::PUT, &goal_uri, Some(&intruder_token), Some(json!({"currentValue": 1}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &goal_uri, Some(&intruder_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn goal_suggestions_follow_subjects() {
    let app = app();
    let (token, user_id) = register(&app, "ada").await;
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/goals/suggestions/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 4);
    assert_eq!(suggestions[0]["title"], "Watch 2 Mathematics videos");
    assert_eq!(suggestions[3]["title"], "Complete 1 quiz");
}

#[tokio::test]
async fn achievement_check_and_leaderboards() {
    let app = app();
    let (token, user_id) = register(&app, "ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/achievements/check/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Achievement check completed");
    assert!(body["awarded"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, &format!("/api/achievements/{user_id}"), Some(&token), None).await;
    assert!(body["achievements"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/api/achievements/leaderboard/points?limit=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let board = body["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["username"], "ada");

    let (status, _) = send(&app, Method::GET, "/api/achievements/leaderboard/streak", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn fun_facts_by_subject() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/fun-facts/mascot", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["fact"]["content"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/fun-facts/science", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/fun-facts/astrology", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn internal_errors_show_detail_only_in_development() {
    let app = broken_app(Environment::Development);
    let (status, body) = send(&app, Method::GET, "/api/content", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("no such table"), "{body}");

    let app = broken_app(Environment::Production);
    let (status, body) = send(&app, Method::GET, "/api/content", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "Something went wrong");
}
