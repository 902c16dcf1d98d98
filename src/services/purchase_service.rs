use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::purchases::{CreatePurchaseRequest, PurchaseCreated, PurchaseOutcome},
    entity::{
        books::Entity as Books,
        purchases::{ActiveModel, Model as PurchaseModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Purchase,
    notifier,
    payment::{PaymentMethod, manual_payment_id, messaging_link},
    response::{ApiResponse, Meta},
    state::AppState,
    token::IssuedToken,
    validation::{FieldErrors, MAX_STRING_LEN, clean_optional},
};

/// Intake input after field validation.
#[derive(Debug)]
struct ValidPurchase {
    book_id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    method: PaymentMethod,
}

fn validate(payload: CreatePurchaseRequest) -> AppResult<ValidPurchase> {
    let mut errors = FieldErrors::default();
    if payload.book_id.is_none() {
        errors.add("book_id", "The book_id field is required.");
    }
    errors.required_text("name", payload.name.as_deref(), Some(MAX_STRING_LEN));
    errors.email("email", payload.email.as_deref());
    errors.optional_text("phone", payload.phone.as_deref(), MAX_STRING_LEN);

    let method = match payload.payment_method.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("payment_method", "The payment_method field is required.");
            None
        }
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(message) => {
                errors.add("payment_method", message);
                None
            }
        },
    };
    errors.finish()?;

    let (Some(book_id), Some(method)) = (payload.book_id, method) else {
        return Err(AppError::BadRequest("incomplete purchase".into()));
    };

    Ok(ValidPurchase {
        book_id,
        name: payload.name.unwrap_or_default().trim().to_string(),
        email: payload.email.unwrap_or_default().trim().to_string(),
        phone: clean_optional(payload.phone),
        method,
    })
}

/// Records a purchase, issues its download token, and settles it through the
/// chosen payment method. The row and its token are committed together, and
/// not at all when the gateway declines.
pub async fn create_purchase(
    state: &AppState,
    actor: Option<&AuthUser>,
    payload: CreatePurchaseRequest,
) -> AppResult<ApiResponse<PurchaseCreated>> {
    let input = validate(payload)?;

    if input.method == PaymentMethod::Manual && !actor.is_some_and(AuthUser::is_admin) {
        return Err(AppError::Forbidden);
    }

    let Some(book) = Books::find_by_id(input.book_id).one(&state.orm).await? else {
        let mut errors = FieldErrors::default();
        errors.add("book_id", "The selected book_id is invalid.");
        return Err(AppError::Validation(errors));
    };

    let now = state.clock.now();
    let issued = IssuedToken::issue(now);

    let txn = state.orm.begin().await?;
    let purchase = ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(book.id),
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        price_paid: Set(book.price),
        payment_method: Set(input.method),
        payment_id: Set(None),
        download_token: Set(issued.value.clone()),
        token_expires_at: Set(issued.expires_at.into()),
        downloaded: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let (purchase, outcome) = settle(state, txn, purchase, now).await?;

    tracing::info!(
        purchase_id = %purchase.id,
        book_id = %purchase.book_id,
        method = purchase.payment_method.as_str(),
        price_paid = %purchase.price_paid,
        "purchase created"
    );

    let purchase = Purchase::from(purchase);

    if let PurchaseOutcome::Gateway { download_url, .. } = &outcome {
        if let Err(err) = notifier::send_download_link(&purchase, download_url).await {
            tracing::warn!(purchase_id = %purchase.id, error = %err, "buyer notification failed");
        }
    }

    audit::record(
        &state.orm,
        actor.map(|user| user.user_id),
        "purchase_create",
        "purchases",
        serde_json::json!({
            "purchase_id": purchase.id,
            "book_id": purchase.book_id,
            "payment_method": purchase.payment_method.as_str(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Purchase created",
        PurchaseCreated {
            purchase,
            download_token: issued.value,
            outcome,
        },
        Some(Meta::empty()),
    ))
}

/// Runs the method-specific step and commits the transaction on success.
async fn settle(
    state: &AppState,
    txn: DatabaseTransaction,
    purchase: PurchaseModel,
    now: DateTime<Utc>,
) -> AppResult<(PurchaseModel, PurchaseOutcome)> {
    match purchase.payment_method {
        PaymentMethod::Gateway => {
            let payment_id = match state.gateway.charge(purchase.id, purchase.price_paid).await {
                Ok(payment_id) => payment_id,
                Err(err) => {
                    tracing::error!(
                        purchase_id = %purchase.id,
                        book_id = %purchase.book_id,
                        error = %err,
                        "gateway payment failed"
                    );
                    txn.rollback().await?;
                    return Err(AppError::PaymentFailed);
                }
            };
            let purchase = record_payment_id(&txn, purchase, payment_id.clone(), now).await?;
            txn.commit().await?;

            let download_url = state.config.download_url(&purchase.download_token);
            Ok((
                purchase,
                PurchaseOutcome::Gateway {
                    payment_id,
                    download_url,
                },
            ))
        }
        PaymentMethod::MessagingHandoff => {
            txn.commit().await?;
            let messaging_url =
                messaging_link(&state.config.messaging_phone, &purchase.name, &purchase.email);
            let purchase_id = purchase.id;
            Ok((
                purchase,
                PurchaseOutcome::MessagingHandoff {
                    messaging_url,
                    purchase_id,
                },
            ))
        }
        PaymentMethod::Manual => {
            let payment_id = manual_payment_id(now);
            let purchase = record_payment_id(&txn, purchase, payment_id.clone(), now).await?;
            txn.commit().await?;

            let download_url = state.config.download_url(&purchase.download_token);
            Ok((
                purchase,
                PurchaseOutcome::Manual {
                    payment_id,
                    download_url,
                },
            ))
        }
    }
}

async fn record_payment_id<C: ConnectionTrait>(
    db: &C,
    purchase: PurchaseModel,
    payment_id: String,
    now: DateTime<Utc>,
) -> AppResult<PurchaseModel> {
    let mut active: ActiveModel = purchase.into();
    active.payment_id = Set(Some(payment_id));
    active.updated_at = Set(now.into());
    Ok(active.update(db).await?)
}
