use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::purchases::{
        CreatePurchaseRequest, PurchaseCreated, PurchaseList, PurchaseListQuery,
        PurchaseStatistics, PurchaseWithBook, RegeneratedToken, UpdatePurchaseRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Purchase,
    response::ApiResponse,
    services::{admin_service, purchase_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase).get(list_purchases))
        .route("/statistics", get(purchase_statistics))
        .route(
            "/{id}",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
        .route("/{id}/regenerate-token", post(regenerate_token))
}

#[utoipa::path(
    post,
    path = "/api/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded and download token issued", body = ApiResponse<PurchaseCreated>),
        (status = 403, description = "Manual grants require an administrator"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Payment could not be processed")
    ),
    tag = "Purchases"
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    payload: Result<Json<CreatePurchaseRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<PurchaseCreated>>)> {
    let Json(payload) = payload?;
    let resp = purchase_service::create_purchase(&state, user.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/purchases",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("book_filter" = Option<Uuid>, Query, description = "Only purchases of this book"),
        ("sort_order" = Option<String>, Query, description = "Sort order by creation: asc, desc (default)")
    ),
    responses(
        (status = 200, description = "List purchases without download tokens", body = ApiResponse<PurchaseList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PurchaseListQuery>,
) -> AppResult<Json<ApiResponse<PurchaseList>>> {
    let resp = admin_service::list_purchases(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/purchases/statistics",
    responses(
        (status = 200, description = "Sales totals and per-book breakdown", body = ApiResponse<PurchaseStatistics>)
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn purchase_statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PurchaseStatistics>>> {
    let resp = admin_service::purchase_statistics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase with its book", body = ApiResponse<PurchaseWithBook>),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn get_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PurchaseWithBook>>> {
    let resp = admin_service::get_purchase(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    request_body = UpdatePurchaseRequest,
    responses(
        (status = 200, description = "Purchase updated", body = ApiResponse<Purchase>),
        (status = 404, description = "Purchase not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn update_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdatePurchaseRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Purchase>>> {
    let Json(payload) = payload?;
    let resp = admin_service::update_purchase(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase deleted"),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn delete_purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_purchase(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/purchases/{id}/regenerate-token",
    params(("id" = Uuid, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "New token and download URL; the old token no longer works", body = ApiResponse<RegeneratedToken>),
        (status = 404, description = "Purchase not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Purchases"
)]
pub async fn regenerate_token(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RegeneratedToken>>> {
    let resp = admin_service::regenerate_token(&state, &user, id).await?;
    Ok(Json(resp))
}
