use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

use server::routes::{self, auth::ServerState};
use service::auth::repository::{mock::MockAuthRepository, AuthRepository};
use service::auth::service::{AuthConfig, AuthService};
use service::submission::repository::{mock::MockSubmissionRepository, SubmissionRepository};
use service::submission::SubmissionService;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

fn build_app() -> Router {
    let auth_repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
    let submission_repo: Arc<dyn SubmissionRepository> = Arc::new(MockSubmissionRepository::default());
    let state = ServerState {
        auth: Arc::new(AuthService::new(auth_repo, AuthConfig::new("test-secret"))),
        submissions: Arc::new(SubmissionService::new(submission_repo)),
    };
    routes::build_router(state, cors())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().call(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

/// Register a student and hand back their token.
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"email": email, "password": "secret1", "name": "Student"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_submit_and_fetch_own_work() {
    let app = build_app();
    let token = register(&app, "a@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/submissions/module-1/submit",
        Some(&token),
        Some(json!({"course_id": "course-9", "answers": {"q1": "a", "q2": "b"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["module_id"], "module-1");

    let (status, body) = send(&app, "GET", "/submissions/student", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/submissions/{}", submission_id);
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], submission_id.as_str());

    let (status, body) = send(
        &app,
        "GET",
        "/submissions/course/course-9",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_foreign_submission_is_never_returned() {
    let app = build_app();
    let owner = register(&app, "owner@x.com").await;
    let intruder = register(&app, "intruder@x.com").await;

    let (_, body) = send(
        &app,
        "POST",
        "/submissions/module-1/submit",
        Some(&owner),
        Some(json!({"answers": {"q1": "a"}})),
    )
    .await;
    let submission_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/submissions/{}", submission_id);
    let (status, body) = send(&app, "GET", &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("data").is_none());

    // The intruder's listings stay empty too.
    let (_, body) = send(&app, "GET", "/submissions/student", Some(&intruder), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_absent_submission_is_not_found() {
    let app = build_app();
    let token = register(&app, "a@x.com").await;
    let uri = format!("/submissions/{}", Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Submission not found");
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = build_app();
    let token = register(&app, "a@x.com").await;

    // No header at all.
    let (status, body) = send(&app, "GET", "/submissions/student", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized");

    // Tampered signature.
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[2] = parts[2].chars().rev().collect();
    let forged = parts.join(".");
    let (status, _) = send(&app, "GET", "/submissions/student", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Submit is protected as well.
    let (status, _) = send(
        &app,
        "POST",
        "/submissions/module-1/submit",
        None,
        Some(json!({"answers": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_single_question_needs_no_token() {
    let app = build_app();
    let student_id = Uuid::new_v4();

    let uri = format!("/submissions/{}/singlequestion", student_id);
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        None,
        Some(json!({"question_id": "q-42", "answer": "blue"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["student_id"], student_id.to_string());
    assert_eq!(body["data"]["question_id"], "q-42");
}

#[tokio::test]
async fn test_course_listing_is_scoped_per_student() {
    let app = build_app();
    let alice = register(&app, "alice@x.com").await;
    let bob = register(&app, "bob@x.com").await;

    for token in [&alice, &bob] {
        let (status, _) = send(
            &app,
            "POST",
            "/submissions/module-1/submit",
            Some(token),
            Some(json!({"course_id": "c1", "answers": {"q": 1}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, "GET", "/submissions/course/c1", Some(&alice), None).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
}
