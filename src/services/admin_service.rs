use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::purchases::{
        BookSales, PurchaseList, PurchaseListQuery, PurchaseStatistics, PurchaseWithBook,
        RegeneratedToken, UpdatePurchaseRequest,
    },
    entity::{
        books::{Column as BookCol, Entity as Books},
        purchases::{ActiveModel, Column, Entity as Purchases},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Purchase,
    response::{ApiResponse, Meta},
    routes::params::SortOrder,
    services::download_service,
    state::AppState,
    validation::{FieldErrors, MAX_STRING_LEN, clean_optional},
};

const RECENT_PURCHASES: u64 = 5;

pub async fn list_purchases(
    state: &AppState,
    user: &AuthUser,
    query: PurchaseListQuery,
) -> AppResult<ApiResponse<PurchaseList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(book_id) = query.book_filter {
        condition = condition.add(Column::BookId.eq(book_id));
    }

    let mut finder = Purchases::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| Purchase::from(model).redacted())
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Purchases", PurchaseList { items }, Some(meta)))
}

pub async fn get_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PurchaseWithBook>> {
    ensure_admin(user)?;

    let purchase = Purchases::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let book = purchase.find_related(Books).one(&state.orm).await?;

    Ok(ApiResponse::success(
        "Purchase found",
        PurchaseWithBook {
            purchase: purchase.into(),
            book: book.map(Into::into),
        },
        Some(Meta::empty()),
    ))
}

/// Corrects buyer contact details or the payment reference. Price, book and
/// download state are not editable.
pub async fn update_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePurchaseRequest,
) -> AppResult<ApiResponse<Purchase>> {
    ensure_admin(user)?;

    let mut errors = FieldErrors::default();
    if payload.name.is_some() {
        errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    }
    if payload.email.is_some() {
        errors.email("email", payload.email.as_deref());
    }
    errors.optional_text("phone", payload.phone.as_deref(), MAX_STRING_LEN);
    errors.optional_text("payment_id", payload.payment_id.as_deref(), MAX_STRING_LEN);
    errors.finish()?;

    let existing = Purchases::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_string());
    }
    if payload.phone.is_some() {
        active.phone = Set(clean_optional(payload.phone));
    }
    if payload.payment_id.is_some() {
        active.payment_id = Set(clean_optional(payload.payment_id));
    }
    active.updated_at = Set(state.clock.now().into());
    let purchase = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "purchase_update",
        "purchases",
        serde_json::json!({ "purchase_id": purchase.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Purchase updated",
        purchase.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_purchase(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Purchases::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "purchase_delete",
        "purchases",
        serde_json::json!({ "purchase_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn regenerate_token(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RegeneratedToken>> {
    ensure_admin(user)?;

    let existing = Purchases::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let (purchase, token) =
        download_service::issue_token(&state.orm, existing, state.clock.now()).await?;
    tracing::info!(purchase_id = %purchase.id, "download token regenerated");

    audit::record(
        &state.orm,
        Some(user.user_id),
        "purchase_token_regenerate",
        "purchases",
        serde_json::json!({ "purchase_id": purchase.id }),
    )
    .await;

    let download_url = state.config.download_url(&token);
    Ok(ApiResponse::success(
        "Download token regenerated",
        RegeneratedToken {
            purchase: purchase.into(),
            download_token: token,
            download_url,
        },
        Some(Meta::empty()),
    ))
}

#[derive(Debug, FromQueryResult)]
struct BookSalesRow {
    book_id: Uuid,
    purchases: i64,
    revenue: Option<Decimal>,
}

pub async fn purchase_statistics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PurchaseStatistics>> {
    ensure_admin(user)?;

    let rows = Purchases::find()
        .select_only()
        .column(Column::BookId)
        .column_as(Column::Id.count(), "purchases")
        .column_as(Column::PricePaid.sum(), "revenue")
        .group_by(Column::BookId)
        .into_model::<BookSalesRow>()
        .all(&state.orm)
        .await?;

    let book_ids: Vec<Uuid> = rows.iter().map(|row| row.book_id).collect();
    let titles: HashMap<Uuid, String> = Books::find()
        .filter(BookCol::Id.is_in(book_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|book| (book.id, book.title))
        .collect();

    let mut total_purchases = 0;
    let mut total_revenue = Decimal::ZERO;
    let mut purchases_by_book: Vec<BookSales> = rows
        .into_iter()
        .map(|row| {
            let revenue = row.revenue.unwrap_or_default();
            total_purchases += row.purchases;
            total_revenue += revenue;
            BookSales {
                book_id: row.book_id,
                title: titles.get(&row.book_id).cloned(),
                purchases: row.purchases,
                revenue,
            }
        })
        .collect();
    purchases_by_book.sort_by(|a, b| b.purchases.cmp(&a.purchases).then(a.title.cmp(&b.title)));

    let total_downloads = Purchases::find()
        .filter(Column::Downloaded.eq(true))
        .count(&state.orm)
        .await? as i64;

    let recent_purchases = Purchases::find()
        .order_by_desc(Column::CreatedAt)
        .limit(RECENT_PURCHASES)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| Purchase::from(model).redacted())
        .collect();

    Ok(ApiResponse::success(
        "Purchase statistics",
        PurchaseStatistics {
            total_purchases,
            total_revenue,
            total_downloads,
            purchases_by_book,
            recent_purchases,
        },
        Some(Meta::empty()),
    ))
}
