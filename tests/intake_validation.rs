mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bookstore_api::{
    routes::build_router, services::auth_service::issue_jwt, state::AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

// Requests here are rejected before any query runs, so no database is needed.
fn test_state() -> AppState {
    let config = common::test_config("postgres://unused", std::env::temp_dir().as_path());
    AppState::new(DatabaseConnection::Disconnected, config)
}

fn app(state: AppState) -> Router {
    build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_purchase(body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/purchases")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn valid_body(method: &str) -> Value {
    json!({
        "book_id": Uuid::new_v4(),
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "payment_method": method,
    })
}

#[tokio::test]
async fn empty_purchase_reports_every_missing_field() {
    let (status, body) = send(app(test_state()), post_purchase(json!({}), None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    let errors = &body["data"]["errors"];
    for field in ["book_id", "name", "email", "payment_method"] {
        assert!(errors[field].is_array(), "missing error for {field}: {body}");
    }
    assert!(errors["phone"].is_null());
}

#[tokio::test]
async fn malformed_email_and_unknown_method_are_field_errors() {
    let mut payload = valid_body("bitcoin");
    payload["email"] = json!("grace-at-example");

    let (status, body) = send(app(test_state()), post_purchase(payload, None)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["data"]["errors"].as_object().unwrap();
    let mut fields: Vec<&str> = errors.keys().map(String::as_str).collect();
    fields.sort();
    assert_eq!(fields, ["email", "payment_method"]);
}

#[tokio::test]
async fn unparseable_body_is_a_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/purchases")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(test_state()), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["errors"]["body"].is_array());
}

#[tokio::test]
async fn manual_grant_requires_an_admin() {
    let state = test_state();

    let (status, _) = send(app(state.clone()), post_purchase(valid_body("manual"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let editor = issue_jwt(&state, Uuid::new_v4(), "editor").unwrap();
    let (status, _) = send(
        app(state.clone()),
        post_purchase(valid_body("manual"), Some(&editor)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app(state),
        post_purchase(valid_body("manual"), Some("not-a-jwt")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn oversized_download_token_is_denied_like_any_other() {
    let request = Request::builder()
        .uri(format!("/api/download/{}", "a".repeat(300)))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(test_state()), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or expired download token.");
    assert!(body["data"].is_null());
}

// Control bytes and undecodable paths never reach the database.
#[tokio::test]
async fn malformed_download_tokens_get_the_same_not_found() {
    for uri in ["/api/download/ab%00cd", "/api/download/%FF%FE", "/api/download/ab-cd"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        let (status, body) = send(app(test_state()), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["message"], "Invalid or expired download token.", "{uri}");
    }
}

#[tokio::test]
async fn admin_routes_require_a_bearer_token() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/authors")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "X", "bio": "Y" }).to_string()))
        .unwrap();

    let (status, _) = send(app(test_state()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/purchases")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(test_state()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let request = Request::builder()
        .uri("/api/does-not-exist")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(test_state()), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["path"], "/api/does-not-exist");
}
