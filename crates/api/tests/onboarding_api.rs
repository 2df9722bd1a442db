//! Integration tests for the `/api/onboarding` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, get, get_auth, post_auth, post_json, post_json_auth, post_raw,
    token_for,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: GET /api/onboarding before any autosave is 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_without_record_returns_404() {
    let app = build_test_app();
    let response = get_auth(app, "/api/onboarding", &token_for(1)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Onboarding record not found");
}

// ---------------------------------------------------------------------------
// Test: first autosave creates the record with defaults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_autosave_creates_record() {
    let app = build_test_app();
    let token = token_for(7);

    let response = post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "preferences", "data": {"interests": ["UI/UX"]}}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let record = body_json(response).await;
    assert_eq!(record["user"], 7);
    assert_eq!(record["preferences"]["interests"], json!(["UI/UX"]));
    assert_eq!(record["isCompleted"], false);
    assert_eq!(record["currentStep"], 1);
    assert_eq!(record["personalInfo"], json!({}));
    assert!(record["lastAutosavedAt"].is_string());

    let fetched = body_json(get_auth(app, "/api/onboarding", &token).await).await;
    assert_eq!(fetched, record);
}

// ---------------------------------------------------------------------------
// Test: successive autosaves of one step merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_successive_autosaves_merge_step_fields() {
    let app = build_test_app();
    let token = token_for(1);

    post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Ann Lee"}}),
        &token,
    )
    .await;
    let response = post_json_auth(
        app,
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"username": "annlee"}}),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(
        record["personalInfo"],
        json!({"fullName": "Ann Lee", "username": "annlee"})
    );
}

// ---------------------------------------------------------------------------
// Test: currentStep is stored when sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_autosave_stores_advisory_current_step() {
    let app = build_test_app();
    let response = post_json_auth(
        app,
        "/api/onboarding/autosave",
        json!({"step": "professionalInfo", "data": {"company": "Acme"}, "currentStep": 3}),
        &token_for(1),
    )
    .await;

    let record = body_json(response).await;
    assert_eq!(record["currentStep"], 3);
    assert_eq!(record["professionalInfo"]["company"], "Acme");
}

// ---------------------------------------------------------------------------
// Test: unknown and reserved step names land in responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unlisted_step_names_are_stored_in_responses() {
    let app = build_test_app();
    let token = token_for(1);

    post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "profileSetup", "data": {"jobStatus": "employed"}}),
        &token,
    )
    .await;
    let response = post_json_auth(
        app,
        "/api/onboarding/autosave",
        json!({"step": "isCompleted", "data": true}),
        &token,
    )
    .await;

    let record = body_json(response).await;
    assert_eq!(record["isCompleted"], false);
    assert_eq!(record["responses"]["isCompleted"], true);
    assert_eq!(record["responses"]["profileSetup"], json!({"jobStatus": "employed"}));
}

// ---------------------------------------------------------------------------
// Test: finalize is idempotent and keeps the record completed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_finalize_marks_record_completed_idempotently() {
    let app = build_test_app();
    let token = token_for(1);

    post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Ann"}}),
        &token,
    )
    .await;

    for _ in 0..2 {
        let response = post_auth(app.clone(), "/api/onboarding/finalize", &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Onboarding completed successfully");
    }

    let record = body_json(get_auth(app, "/api/onboarding", &token).await).await;
    assert_eq!(record["isCompleted"], true);
    assert_eq!(record["personalInfo"]["fullName"], "Ann");
}

// ---------------------------------------------------------------------------
// Test: finalize without a record is 404 and creates nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_finalize_without_record_returns_404() {
    let app = build_test_app();
    let token = token_for(1);

    let response = post_auth(app.clone(), "/api/onboarding/finalize", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/onboarding", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: records are isolated per user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_records_are_scoped_to_the_token_subject() {
    let app = build_test_app();

    post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Ann"}}),
        &token_for(1),
    )
    .await;

    let response = get_auth(app, "/api/onboarding", &token_for(2)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: locked policy rejects autosave after completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_locked_policy_rejects_autosave_after_finalize() {
    let mut config = common::test_config();
    config.allow_edits_after_completion = false;
    let app = common::build_test_app_with(config);
    let token = token_for(1);

    post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Ann"}}),
        &token,
    )
    .await;
    post_auth(app.clone(), "/api/onboarding/finalize", &token).await;

    let response = post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Bob"}}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let record = body_json(get_auth(app, "/api/onboarding", &token).await).await;
    assert_eq!(record["personalInfo"]["fullName"], "Ann");
}

// ---------------------------------------------------------------------------
// Test: authentication is required
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_token_returns_401() {
    let app = build_test_app();

    let response = get(app.clone(), "/api/onboarding").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = post_json(
        app,
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_returns_401() {
    let app = build_test_app();
    let response = get_auth(app, "/api/onboarding", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: loosely-formed autosave bodies still save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_autosave_without_step_stamps_record() {
    let app = build_test_app();
    let token = token_for(1);

    let response = post_json_auth(
        app.clone(),
        "/api/onboarding/autosave",
        json!({"data": {"a": 1}}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let record = body_json(response).await;
    assert_eq!(record["user"], 1);
    assert_eq!(record["personalInfo"], json!({}));
    assert_eq!(record["responses"], json!({}));
    assert!(record["lastAutosavedAt"].is_string());

    let response = get_auth(app, "/api/onboarding", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_autosave_accepts_numeric_string_current_step() {
    let app = build_test_app();
    let response = post_json_auth(
        app,
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {}, "currentStep": "3"}),
        &token_for(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["currentStep"], 3);
}

#[tokio::test]
async fn test_autosave_ignores_unusable_current_step() {
    let app = build_test_app();
    let response = post_json_auth(
        app,
        "/api/onboarding/autosave",
        json!({"step": "personalInfo", "data": {"fullName": "Ann"}, "currentStep": "next"}),
        &token_for(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(record["currentStep"], 1);
    assert_eq!(record["personalInfo"]["fullName"], "Ann");
}

// ---------------------------------------------------------------------------
// Test: an unreadable body keeps the JSON error shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_autosave_with_invalid_json_returns_error_body() {
    let app = build_test_app();
    let response = post_raw(
        app,
        "/api/onboarding/autosave",
        "{not json",
        Some(&token_for(1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}
