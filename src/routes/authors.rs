use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::authors::{
        AuthorList, AuthorListQuery, AuthorWithBooks, CreateAuthorRequest, UpdateAuthorRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Author,
    response::ApiResponse,
    services::author_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
}

#[utoipa::path(
    get,
    path = "/api/authors",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("book_filter" = Option<Uuid>, Query, description = "Only the author of this book")
    ),
    responses(
        (status = 200, description = "List authors", body = ApiResponse<AuthorList>)
    ),
    tag = "Authors"
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<AuthorListQuery>,
) -> AppResult<Json<ApiResponse<AuthorList>>> {
    let resp = author_service::list_authors(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/authors/{id}",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author with books", body = ApiResponse<AuthorWithBooks>),
        (status = 404, description = "Author not found")
    ),
    tag = "Authors"
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AuthorWithBooks>>> {
    let resp = author_service::get_author(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/authors",
    request_body = CreateAuthorRequest,
    responses(
        (status = 201, description = "Author created", body = ApiResponse<Author>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Authors"
)]
pub async fn create_author(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAuthorRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Author>>)> {
    let resp = author_service::create_author(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/authors/{id}",
    params(("id" = Uuid, Path, description = "Author ID")),
    request_body = UpdateAuthorRequest,
    responses(
        (status = 200, description = "Author updated", body = ApiResponse<Author>),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Authors"
)]
pub async fn update_author(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAuthorRequest>,
) -> AppResult<Json<ApiResponse<Author>>> {
    let resp = author_service::update_author(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/authors/{id}",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author deleted"),
        (status = 422, description = "Author still has books")
    ),
    security(("bearer_auth" = [])),
    tag = "Authors"
)]
pub async fn delete_author(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = author_service::delete_author(&state, &user, id).await?;
    Ok(Json(resp))
}
