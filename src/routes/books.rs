use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{
        books::{
            BookDetail, BookList, BookListQuery, CreateBookRequest, DigitalBookUploaded,
            UpdateBookRequest,
        },
        faqs::{FaqList, ReorderFaqsRequest},
        testimonials::TestimonialList,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Book,
    response::ApiResponse,
    services::{book_service, faq_service, testimonial_service},
    state::AppState,
};

const DIGITAL_BOOK_FIELD: &str = "digital_book";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/{id}/digital-book", post(upload_digital_book))
        .route("/{id}/testimonials", get(book_testimonials))
        .route("/{id}/faqs", get(book_faqs))
        .route("/{id}/faqs/reorder", put(reorder_faqs))
}

/// Multipart form accepted by the digital book upload.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DigitalBookForm {
    #[schema(value_type = String, format = Binary)]
    digital_book: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("author_filter" = Option<Uuid>, Query, description = "Only books by this author")
    ),
    responses(
        (status = 200, description = "List books", body = ApiResponse<BookList>)
    ),
    tag = "Books"
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let resp = book_service::list_books(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with author, testimonials and FAQs", body = ApiResponse<BookDetail>),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookDetail>>> {
    let resp = book_service::get_book(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/landing",
    responses(
        (status = 200, description = "Storefront landing page data", body = ApiResponse<BookDetail>),
        (status = 404, description = "No book in the catalog yet")
    ),
    tag = "Books"
)]
pub async fn landing_page(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<BookDetail>>> {
    let resp = book_service::landing_page(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = ApiResponse<Book>),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let resp = book_service::create_book(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = ApiResponse<Book>),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let resp = book_service::update_book(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book has purchases")
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = book_service::delete_book(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/digital-book",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body(content = DigitalBookForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Digital book stored", body = ApiResponse<DigitalBookUploaded>),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Not a PDF or too large")
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn upload_digital_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<DigitalBookUploaded>>> {
    let mut file_name = None;
    let mut bytes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(DIGITAL_BOOK_FIELD) {
            continue;
        }
        file_name = field.file_name().map(str::to_string);
        bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
            .to_vec();
    }

    let resp = book_service::upload_digital_book(&state, &user, id, file_name, bytes).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/testimonials",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Testimonials for the book", body = ApiResponse<TestimonialList>),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn book_testimonials(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = testimonial_service::list_for_book(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/faqs",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "FAQs for the book, by position", body = ApiResponse<FaqList>),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn book_faqs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = faq_service::list_for_book(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}/faqs/reorder",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = ReorderFaqsRequest,
    responses(
        (status = 200, description = "FAQs in their new order", body = ApiResponse<FaqList>),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Unknown FAQ id for this book")
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn reorder_faqs(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderFaqsRequest>,
) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = faq_service::reorder_faqs(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
