use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::testimonials::{
        CreateTestimonialRequest, TestimonialList, TestimonialListQuery, UpdateTestimonialRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Testimonial,
    response::ApiResponse,
    services::testimonial_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_testimonials).post(create_testimonial))
        .route(
            "/{id}",
            get(get_testimonial)
                .put(update_testimonial)
                .delete(delete_testimonial),
        )
}

#[utoipa::path(
    get,
    path = "/api/testimonials",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("book_filter" = Option<Uuid>, Query, description = "Only testimonials for this book")
    ),
    responses(
        (status = 200, description = "List testimonials", body = ApiResponse<TestimonialList>)
    ),
    tag = "Testimonials"
)]
pub async fn list_testimonials(
    State(state): State<AppState>,
    Query(query): Query<TestimonialListQuery>,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = testimonial_service::list_testimonials(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Testimonial", body = ApiResponse<Testimonial>),
        (status = 404, description = "Testimonial not found")
    ),
    tag = "Testimonials"
)]
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = testimonial_service::get_testimonial(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialRequest,
    responses(
        (status = 201, description = "Testimonial created", body = ApiResponse<Testimonial>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTestimonialRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Testimonial>>)> {
    let resp = testimonial_service::create_testimonial(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial ID")),
    request_body = UpdateTestimonialRequest,
    responses(
        (status = 200, description = "Testimonial updated", body = ApiResponse<Testimonial>),
        (status = 404, description = "Testimonial not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn update_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = testimonial_service::update_testimonial(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Testimonial deleted"),
        (status = 404, description = "Testimonial not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Testimonials"
)]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = testimonial_service::delete_testimonial(&state, &user, id).await?;
    Ok(Json(resp))
}
