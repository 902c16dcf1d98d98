use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::authors::{AuthorList, AuthorListQuery, AuthorWithBooks, CreateAuthorRequest, UpdateAuthorRequest},
    entity::{
        authors::{ActiveModel, Column, Entity as Authors},
        books::{Column as BookCol, Entity as Books},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Author, Book},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_STRING_LEN, clean_optional},
};

pub async fn list_authors(
    state: &AppState,
    query: AuthorListQuery,
) -> AppResult<ApiResponse<AuthorList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(book_id) = query.book_filter {
        let author_ids: Vec<Uuid> = Books::find()
            .select_only()
            .column(BookCol::AuthorId)
            .filter(BookCol::Id.eq(book_id))
            .into_tuple::<Uuid>()
            .all(&state.orm)
            .await?;
        condition = condition.add(Column::Id.is_in(author_ids));
    }

    let finder = Authors::find().filter(condition).order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Author::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Authors", AuthorList { items }, Some(meta)))
}

pub async fn get_author(state: &AppState, id: Uuid) -> AppResult<ApiResponse<AuthorWithBooks>> {
    let author = Authors::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let books: Vec<Book> = author
        .find_related(Books)
        .order_by_asc(BookCol::Title)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::success(
        "Author",
        AuthorWithBooks {
            author: author.into(),
            books,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_author(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAuthorRequest,
) -> AppResult<ApiResponse<Author>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    errors.required_text("bio", payload.bio.as_deref(), None);
    errors.finish()?;

    let now = state.clock.now();
    let author = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.unwrap_or_default().trim().to_string()),
        bio: Set(payload.bio.unwrap_or_default().trim().to_string()),
        image: Set(clean_optional(payload.image)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "author_create",
        "authors",
        serde_json::json!({ "author_id": author.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Author created",
        author.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_author(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAuthorRequest,
) -> AppResult<ApiResponse<Author>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if payload.name.is_some() {
        errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    }
    if payload.bio.is_some() {
        errors.required_text("bio", payload.bio.as_deref(), None);
    }
    errors.finish()?;

    let existing = Authors::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(bio.trim().to_string());
    }
    if payload.remove_image {
        active.image = Set(None);
    } else if let Some(image) = clean_optional(payload.image) {
        active.image = Set(Some(image));
    }
    active.updated_at = Set(state.clock.now().into());
    let author = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "author_update",
        "authors",
        serde_json::json!({ "author_id": author.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        author.into(),
        Some(Meta::empty()),
    ))
}

const AUTHOR_HAS_BOOKS: &str = "Cannot delete author with associated books.";

pub async fn delete_author(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let author = Authors::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let books = Books::find()
        .filter(BookCol::AuthorId.eq(author.id))
        .count(&state.orm)
        .await?;
    if books > 0 {
        return Err(AppError::Conflict(AUTHOR_HAS_BOOKS.into()));
    }

    author
        .delete(&state.orm)
        .await
        .map_err(|e| AppError::restricted(e, AUTHOR_HAS_BOOKS))?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "author_delete",
        "authors",
        serde_json::json!({ "author_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
