mod common;

use axum::extract::State;
use bookstore_api::{routes::health::health_check, state::AppState};
use sea_orm::DatabaseConnection;

#[tokio::test]
async fn health_check_reports_unreachable_database() {
    let storage = tempfile::tempdir().expect("tempdir");
    let config = common::test_config("postgres://unused", storage.path());
    let state = AppState::new(DatabaseConnection::Disconnected, config);

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "degraded");
    assert_eq!(data.database, "down");
}
