use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::books::{
        BookDetail, BookList, BookListQuery, CreateBookRequest, DigitalBookUploaded,
        UpdateBookRequest,
    },
    entity::{
        authors::Entity as Authors,
        books::{ActiveModel, Column, Entity as Books, Model as BookModel},
        faqs::{Column as FaqCol, Entity as Faqs},
        purchases::{Column as PurchaseCol, Entity as Purchases},
        testimonials::{Column as TestimonialCol, Entity as Testimonials},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Book,
    response::{ApiResponse, Meta},
    state::AppState,
    storage::looks_like_pdf,
    validation::{FieldErrors, MAX_STRING_LEN, clean_optional},
};

pub async fn list_books(state: &AppState, query: BookListQuery) -> AppResult<ApiResponse<BookList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Books::find();
    if let Some(author_id) = query.author_filter {
        finder = finder.filter(Column::AuthorId.eq(author_id));
    }
    finder = finder.order_by_asc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Book::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Books", BookList { items }, Some(meta)))
}

pub async fn get_book(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BookDetail>> {
    let book = Books::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = load_detail(&state.orm, book).await?;
    Ok(ApiResponse::success("Book", detail, Some(Meta::empty())))
}

/// Storefront data: the first catalogued book with its author, testimonials and FAQs.
pub async fn landing_page(state: &AppState) -> AppResult<ApiResponse<BookDetail>> {
    let book = Books::find()
        .order_by_asc(Column::CreatedAt)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = load_detail(&state.orm, book).await?;
    Ok(ApiResponse::success("Landing page", detail, Some(Meta::empty())))
}

async fn load_detail<C: ConnectionTrait>(db: &C, book: BookModel) -> AppResult<BookDetail> {
    let author = book.find_related(Authors).one(db).await?.map(Into::into);
    let testimonials = book
        .find_related(Testimonials)
        .order_by_asc(TestimonialCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let faqs = book
        .find_related(Faqs)
        .order_by_asc(FaqCol::Position)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(BookDetail {
        book: book.into(),
        author,
        testimonials,
        faqs,
    })
}

pub async fn create_book(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookRequest,
) -> AppResult<ApiResponse<Book>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    errors.required_text("title", payload.title.as_deref(), Some(MAX_STRING_LEN));
    errors.optional_text("subtitle", payload.subtitle.as_deref(), MAX_STRING_LEN);
    errors.required_text("description", payload.description.as_deref(), None);
    errors.non_negative_price("price", payload.price);
    match payload.author_id {
        None => errors.add("author_id", "The author_id field is required."),
        Some(author_id) => {
            if Authors::find_by_id(author_id).one(&state.orm).await?.is_none() {
                errors.add("author_id", "The selected author_id is invalid.");
            }
        }
    }
    errors.finish()?;

    let now = state.clock.now();
    let book = ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(payload.author_id.unwrap_or_default()),
        title: Set(payload.title.unwrap_or_default().trim().to_string()),
        subtitle: Set(clean_optional(payload.subtitle)),
        description: Set(payload.description.unwrap_or_default().trim().to_string()),
        price: Set(payload.price.unwrap_or_default()),
        cover_image: Set(clean_optional(payload.cover_image)),
        features: Set(serde_json::json!(payload.features.unwrap_or_default())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "book_create",
        "books",
        serde_json::json!({ "book_id": book.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Book created",
        book.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_book(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookRequest,
) -> AppResult<ApiResponse<Book>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if payload.title.is_some() {
        errors.required_text("title", payload.title.as_deref(), Some(MAX_STRING_LEN));
    }
    errors.optional_text("subtitle", payload.subtitle.as_deref(), MAX_STRING_LEN);
    if payload.description.is_some() {
        errors.required_text("description", payload.description.as_deref(), None);
    }
    if payload.price.is_some() {
        errors.non_negative_price("price", payload.price);
    }
    if let Some(author_id) = payload.author_id {
        if Authors::find_by_id(author_id).one(&state.orm).await?.is_none() {
            errors.add("author_id", "The selected author_id is invalid.");
        }
    }
    errors.finish()?;

    let existing = Books::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(author_id) = payload.author_id {
        active.author_id = Set(author_id);
    }
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if payload.subtitle.is_some() {
        active.subtitle = Set(clean_optional(payload.subtitle));
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    // Past purchases keep their own price_paid snapshot.
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if payload.remove_cover_image {
        active.cover_image = Set(None);
    } else if let Some(cover) = clean_optional(payload.cover_image) {
        active.cover_image = Set(Some(cover));
    }
    if let Some(features) = payload.features {
        active.features = Set(serde_json::json!(features));
    }
    active.updated_at = Set(state.clock.now().into());
    let book = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "book_update",
        "books",
        serde_json::json!({ "book_id": book.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        book.into(),
        Some(Meta::empty()),
    ))
}

const BOOK_HAS_PURCHASES: &str = "Cannot delete book with associated purchases.";

pub async fn delete_book(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let book = Books::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let purchases = Purchases::find()
        .filter(PurchaseCol::BookId.eq(book.id))
        .count(&state.orm)
        .await?;
    if purchases > 0 {
        return Err(AppError::Conflict(BOOK_HAS_PURCHASES.into()));
    }

    // testimonials and faqs cascade; a purchase racing in is caught by the FK
    book.delete(&state.orm)
        .await
        .map_err(|e| AppError::restricted(e, BOOK_HAS_PURCHASES))?;

    if let Err(err) = state.assets.remove_digital_book(id).await {
        tracing::warn!(book_id = %id, error = %err, "failed to remove digital book file");
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "book_delete",
        "books",
        serde_json::json!({ "book_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Stores (or replaces) the PDF served to buyers of this book.
pub async fn upload_digital_book(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    file_name: Option<String>,
    bytes: Vec<u8>,
) -> AppResult<ApiResponse<DigitalBookUploaded>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if bytes.is_empty() {
        errors.add("digital_book", "The digital_book field is required.");
    } else {
        let pdf_name = file_name
            .as_deref()
            .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(true);
        if !pdf_name || !looks_like_pdf(&bytes) {
            errors.add("digital_book", "The digital_book must be a file of type: pdf.");
        }
        if bytes.len() > state.config.max_upload_bytes {
            errors.add(
                "digital_book",
                format!(
                    "The digital_book may not be greater than {} bytes.",
                    state.config.max_upload_bytes
                ),
            );
        }
    }
    errors.finish()?;

    let book = Books::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let path = state.assets.store_digital_book(book.id, &bytes).await?;
    tracing::info!(book_id = %book.id, path = %path.display(), bytes = bytes.len(), "digital book stored");

    audit::record(
        &state.orm,
        Some(user.user_id),
        "digital_book_upload",
        "books",
        serde_json::json!({ "book_id": book.id, "bytes": bytes.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Digital book uploaded successfully",
        DigitalBookUploaded {
            book_id: book.id,
            bytes: bytes.len(),
        },
        Some(Meta::empty()),
    ))
}
