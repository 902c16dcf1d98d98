use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::faqs::{CreateFaqRequest, FaqList, FaqListQuery, UpdateFaqRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Faq,
    response::ApiResponse,
    services::faq_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_faqs).post(create_faq))
        .route("/{id}", get(get_faq).put(update_faq).delete(delete_faq))
}

#[utoipa::path(
    get,
    path = "/api/faqs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("book_filter" = Option<Uuid>, Query, description = "Only FAQs for this book")
    ),
    responses(
        (status = 200, description = "List FAQs", body = ApiResponse<FaqList>)
    ),
    tag = "FAQs"
)]
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqListQuery>,
) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = faq_service::list_faqs(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/faqs/{id}",
    params(("id" = Uuid, Path, description = "FAQ ID")),
    responses(
        (status = 200, description = "FAQ", body = ApiResponse<Faq>),
        (status = 404, description = "FAQ not found")
    ),
    tag = "FAQs"
)]
pub async fn get_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Faq>>> {
    let resp = faq_service::get_faq(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/faqs",
    request_body = CreateFaqRequest,
    responses(
        (status = 201, description = "FAQ created", body = ApiResponse<Faq>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "FAQs"
)]
pub async fn create_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFaqRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Faq>>)> {
    let resp = faq_service::create_faq(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/faqs/{id}",
    params(("id" = Uuid, Path, description = "FAQ ID")),
    request_body = UpdateFaqRequest,
    responses(
        (status = 200, description = "FAQ updated", body = ApiResponse<Faq>),
        (status = 404, description = "FAQ not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "FAQs"
)]
pub async fn update_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFaqRequest>,
) -> AppResult<Json<ApiResponse<Faq>>> {
    let resp = faq_service::update_faq(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/faqs/{id}",
    params(("id" = Uuid, Path, description = "FAQ ID")),
    responses(
        (status = 200, description = "FAQ deleted"),
        (status = 404, description = "FAQ not found")
    ),
    security(("bearer_auth" = [])),
    tag = "FAQs"
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = faq_service::delete_faq(&state, &user, id).await?;
    Ok(Json(resp))
}
