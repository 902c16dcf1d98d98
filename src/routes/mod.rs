use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    response::ApiResponse,
    state::AppState,
};

/// Headroom over the upload limit for multipart framing and the other form fields.
const BODY_LIMIT_MARGIN: usize = 64 * 1024;

pub mod auth;
pub mod authors;
pub mod books;
pub mod doc;
pub mod download;
pub mod faqs;
pub mod health;
pub mod params;
pub mod purchases;
pub mod testimonials;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/authors", authors::router())
        .nest("/books", books::router())
        .nest("/testimonials", testimonials::router())
        .nest("/faqs", faqs::router())
        .nest("/purchases", purchases::router())
        .nest("/download", download::router())
        .route("/landing", get(books::landing_page))
}

/// Full application router: health, docs, `/api`, and the JSON fallback.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + BODY_LIMIT_MARGIN;

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::failure(
        "Not Found",
        Some(serde_json::json!({ "path": uri.path() })),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
