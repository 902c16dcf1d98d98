use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::faqs::{CreateFaqRequest, FaqList, FaqListQuery, ReorderFaqsRequest, UpdateFaqRequest},
    entity::{
        books::Entity as Books,
        faqs::{ActiveModel, Column, Entity as Faqs},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Faq,
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_STRING_LEN},
};

pub async fn list_faqs(state: &AppState, query: FaqListQuery) -> AppResult<ApiResponse<FaqList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Faqs::find();
    if let Some(book_id) = query.book_filter {
        finder = finder.filter(Column::BookId.eq(book_id));
    }
    finder = finder
        .order_by_asc(Column::BookId)
        .order_by_asc(Column::Position);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Faq::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("FAQs", FaqList { items }, Some(meta)))
}

pub async fn list_for_book(state: &AppState, book_id: Uuid) -> AppResult<ApiResponse<FaqList>> {
    if Books::find_by_id(book_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let items = book_faqs(&state.orm, book_id).await?;
    Ok(ApiResponse::success(
        "FAQs",
        FaqList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_faq(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Faq>> {
    let faq = Faqs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("FAQ", faq.into(), Some(Meta::empty())))
}

pub async fn create_faq(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFaqRequest,
) -> AppResult<ApiResponse<Faq>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    errors.required_text("question", payload.question.as_deref(), Some(MAX_STRING_LEN));
    errors.required_text("answer", payload.answer.as_deref(), None);
    check_position(&mut errors, payload.position);
    match payload.book_id {
        None => errors.add("book_id", "The book_id field is required."),
        Some(book_id) => {
            if Books::find_by_id(book_id).one(&state.orm).await?.is_none() {
                errors.add("book_id", "The selected book_id is invalid.");
            }
        }
    }
    errors.finish()?;

    let book_id = payload.book_id.unwrap_or_default();
    let position = match payload.position {
        Some(position) => position,
        None => next_position(&state.orm, book_id).await?,
    };

    let now = state.clock.now();
    let faq = ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(book_id),
        question: Set(payload.question.unwrap_or_default().trim().to_string()),
        answer: Set(payload.answer.unwrap_or_default().trim().to_string()),
        position: Set(position),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "faq_create",
        "faqs",
        serde_json::json!({ "faq_id": faq.id, "book_id": faq.book_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "FAQ created",
        faq.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_faq(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFaqRequest,
) -> AppResult<ApiResponse<Faq>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if payload.question.is_some() {
        errors.required_text("question", payload.question.as_deref(), Some(MAX_STRING_LEN));
    }
    if payload.answer.is_some() {
        errors.required_text("answer", payload.answer.as_deref(), None);
    }
    check_position(&mut errors, payload.position);
    if let Some(book_id) = payload.book_id {
        if Books::find_by_id(book_id).one(&state.orm).await?.is_none() {
            errors.add("book_id", "The selected book_id is invalid.");
        }
    }
    errors.finish()?;

    let existing = Faqs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(book_id) = payload.book_id {
        active.book_id = Set(book_id);
    }
    if let Some(question) = payload.question {
        active.question = Set(question.trim().to_string());
    }
    if let Some(answer) = payload.answer {
        active.answer = Set(answer.trim().to_string());
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }
    active.updated_at = Set(state.clock.now().into());
    let faq = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "faq_update",
        "faqs",
        serde_json::json!({ "faq_id": faq.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        faq.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_faq(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Faqs::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "faq_delete",
        "faqs",
        serde_json::json!({ "faq_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Rewrites positions of a book's FAQs to follow the order of `faq_ids`.
pub async fn reorder_faqs(
    state: &AppState,
    user: &AuthUser,
    book_id: Uuid,
    payload: ReorderFaqsRequest,
) -> AppResult<ApiResponse<FaqList>> {
    ensure_admin(user)?;

    if payload.faq_ids.is_empty() {
        let mut errors = FieldErrors::default();
        errors.add("faq_ids", "The faq_ids field is required.");
        errors.finish()?;
    }

    let txn = state.orm.begin().await?;

    if Books::find_by_id(book_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut existing: HashMap<Uuid, _> = Faqs::find()
        .filter(Column::BookId.eq(book_id))
        .filter(Column::Id.is_in(payload.faq_ids.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|faq| (faq.id, faq))
        .collect();

    let mut errors = FieldErrors::default();
    for id in &payload.faq_ids {
        if !existing.contains_key(id) {
            errors.add("faq_ids", format!("FAQ {id} does not belong to this book."));
        }
    }
    errors.finish()?;

    let now = state.clock.now();
    for (position, id) in payload.faq_ids.iter().enumerate() {
        let Some(faq) = existing.remove(id) else {
            continue;
        };
        let mut active: ActiveModel = faq.into();
        active.position = Set(position as i32);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;
    }

    let items = book_faqs(&txn, book_id).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "faq_reorder",
        "faqs",
        serde_json::json!({ "book_id": book_id, "faq_ids": payload.faq_ids }),
    )
    .await;

    Ok(ApiResponse::success(
        "FAQs reordered",
        FaqList { items },
        Some(Meta::empty()),
    ))
}

fn check_position(errors: &mut FieldErrors, position: Option<i32>) {
    if position.is_some_and(|p| p < 0) {
        errors.add("position", "The position must be at least 0.");
    }
}

async fn book_faqs<C: ConnectionTrait>(db: &C, book_id: Uuid) -> AppResult<Vec<Faq>> {
    let items = Faqs::find()
        .filter(Column::BookId.eq(book_id))
        .order_by_asc(Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(Faq::from)
        .collect();
    Ok(items)
}

async fn next_position<C: ConnectionTrait>(db: &C, book_id: Uuid) -> AppResult<i32> {
    let max = Faqs::find()
        .select_only()
        .column_as(Column::Position.max(), "max_position")
        .filter(Column::BookId.eq(book_id))
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();

    Ok(max.map_or(0, |p| p + 1))
}
