use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::testimonials::{
        CreateTestimonialRequest, TestimonialList, TestimonialListQuery, UpdateTestimonialRequest,
    },
    entity::{
        books::Entity as Books,
        testimonials::{ActiveModel, Column, Entity as Testimonials},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Testimonial,
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_STRING_LEN},
};

const DEFAULT_RATING: i32 = 5;

pub async fn list_testimonials(
    state: &AppState,
    query: TestimonialListQuery,
) -> AppResult<ApiResponse<TestimonialList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Testimonials::find();
    if let Some(book_id) = query.book_filter {
        finder = finder.filter(Column::BookId.eq(book_id));
    }
    finder = finder.order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Testimonial::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Testimonials",
        TestimonialList { items },
        Some(meta),
    ))
}

pub async fn list_for_book(
    state: &AppState,
    book_id: Uuid,
) -> AppResult<ApiResponse<TestimonialList>> {
    let book = Books::find_by_id(book_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = book
        .find_related(Testimonials)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Testimonial::from)
        .collect();

    Ok(ApiResponse::success(
        "Testimonials",
        TestimonialList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_testimonial(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Testimonial>> {
    let testimonial = Testimonials::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Testimonial",
        testimonial.into(),
        Some(Meta::empty()),
    ))
}

pub async fn create_testimonial(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    ensure_admin(user)?;

    let rating = payload.rating.unwrap_or(DEFAULT_RATING);
    let mut errors = FieldErrors::default();
    errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    errors.required_text("text", payload.text.as_deref(), None);
    errors.rating("rating", rating);
    check_book(state, &mut errors, payload.book_id, true).await?;
    errors.finish()?;

    let now = state.clock.now();
    let testimonial = ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(payload.book_id.unwrap_or_default()),
        name: Set(payload.name.unwrap_or_default().trim().to_string()),
        text: Set(payload.text.unwrap_or_default().trim().to_string()),
        rating: Set(rating),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "testimonial_create",
        "testimonials",
        serde_json::json!({ "testimonial_id": testimonial.id, "book_id": testimonial.book_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Testimonial created",
        testimonial.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if payload.name.is_some() {
        errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    }
    if payload.text.is_some() {
        errors.required_text("text", payload.text.as_deref(), None);
    }
    if let Some(rating) = payload.rating {
        errors.rating("rating", rating);
    }
    check_book(state, &mut errors, payload.book_id, false).await?;
    errors.finish()?;

    let existing = Testimonials::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(book_id) = payload.book_id {
        active.book_id = Set(book_id);
    }
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(text) = payload.text {
        active.text = Set(text.trim().to_string());
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    active.updated_at = Set(state.clock.now().into());
    let testimonial = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "testimonial_update",
        "testimonials",
        serde_json::json!({ "testimonial_id": testimonial.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        testimonial.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Testimonials::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "testimonial_delete",
        "testimonials",
        serde_json::json!({ "testimonial_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn check_book(
    state: &AppState,
    errors: &mut FieldErrors,
    book_id: Option<Uuid>,
    required: bool,
) -> AppResult<()> {
    match book_id {
        None if required => errors.add("book_id", "The book_id field is required."),
        None => {}
        Some(book_id) => {
            if Books::find_by_id(book_id).one(&state.orm).await?.is_none() {
                errors.add("book_id", "The selected book_id is invalid.");
            }
        }
    }
    Ok(())
}
