mod common;

use std::collections::HashSet;

use axum::{body::to_bytes, response::IntoResponse};
use bookstore_api::{
    dto::{
        books::UpdateBookRequest,
        purchases::{CreatePurchaseRequest, PurchaseOutcome},
    },
    entity::{
        books::Entity as Books,
        purchases::{Column as PurchaseCol, Entity as Purchases},
    },
    error::AppError,
    payment::{GatewayMode, SimulatedGateway},
    services::{book_service, download_service, purchase_service},
    token::TOKEN_LEN,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use common::{PDF_BYTES, admin, create_book, database_url, fixed_now, setup_state};

fn purchase_request(book_id: Uuid, method: &str) -> CreatePurchaseRequest {
    CreatePurchaseRequest {
        book_id: Some(book_id),
        name: Some("Ada Lovelace".into()),
        email: Some("ada@example.com".into()),
        phone: Some("+44 20 7946 0000".into()),
        payment_method: Some(method.into()),
    }
}

async fn error_body(err: AppError) -> (u16, serde_json::Value) {
    let response = err.into_response();
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// Price snapshot, alternative payment methods, failures and ledger invariants.
#[tokio::test]
async fn purchase_methods_and_ledger_rules() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let storage = tempfile::tempdir()?;
    let state = setup_state(&database_url, storage.path()).await?;
    let admin = admin();

    let book = create_book(&state, "Snapshot Pricing", Decimal::new(1000, 2)).await?;
    state.assets.store_digital_book(book.id, PDF_BYTES).await?;

    let first = purchase_service::create_purchase(&state, None, purchase_request(book.id, "gateway"))
        .await?
        .data
        .unwrap()
        .purchase;

    // A later price change leaves the earlier purchase untouched.
    book_service::update_book(
        &state,
        &admin,
        book.id,
        UpdateBookRequest {
            price: Some(Decimal::new(2500, 2)),
            ..Default::default()
        },
    )
    .await?;
    let stored = Purchases::find_by_id(first.id).one(&state.orm).await?.unwrap();
    assert_eq!(stored.price_paid, Decimal::new(1000, 2));

    // Messaging hand-off: no payment id, deep link with the buyer's details.
    let handoff = purchase_service::create_purchase(
        &state,
        None,
        purchase_request(book.id, "messaging-handoff"),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(handoff.purchase.price_paid, Decimal::new(2500, 2));
    assert_eq!(handoff.purchase.payment_id, None);
    assert_eq!(handoff.download_token.len(), TOKEN_LEN);
    let PurchaseOutcome::MessagingHandoff {
        messaging_url,
        purchase_id,
    } = handoff.outcome
    else {
        panic!("expected messaging hand-off outcome");
    };
    assert_eq!(purchase_id, handoff.purchase.id);
    assert!(messaging_url.starts_with("https://wa.me/5511999999999?text="));
    assert!(messaging_url.contains("Ada%20Lovelace"));
    assert!(messaging_url.contains("ada%40example.com"));

    // Manual grants are admin-only.
    let forbidden = purchase_service::create_purchase(&state, None, purchase_request(book.id, "manual"))
        .await
        .unwrap_err();
    assert!(matches!(forbidden, AppError::Forbidden));

    let manual = purchase_service::create_purchase(
        &state,
        Some(&admin),
        purchase_request(book.id, "manual"),
    )
    .await?
    .data
    .unwrap();
    let expected_id = format!("manual-{}", fixed_now().timestamp());
    assert_eq!(manual.purchase.payment_id.as_deref(), Some(expected_id.as_str()));
    assert!(matches!(manual.outcome, PurchaseOutcome::Manual { .. }));

    // Unknown book is a field error and persists nothing.
    let before = Purchases::find().count(&state.orm).await?;
    let err = purchase_service::create_purchase(
        &state,
        None,
        purchase_request(Uuid::new_v4(), "gateway"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("book_id")));

    // A declined charge rolls the purchase back.
    let mut declining = state.clone();
    declining.gateway = SimulatedGateway::new(GatewayMode::Declining);
    let err = purchase_service::create_purchase(&declining, None, purchase_request(book.id, "gateway"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PaymentFailed));
    assert_eq!(Purchases::find().count(&state.orm).await?, before);

    // Books with purchases cannot be deleted.
    let err = book_service::delete_book(&state, &admin, book.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(error_body(err).await.0, 422);
    assert_eq!(
        Purchases::find()
            .filter(PurchaseCol::BookId.eq(book.id))
            .count(&state.orm)
            .await?,
        before
    );
    assert!(state.assets.has_digital_book(book.id).await);

    // The foreign key refuses the delete too, and that maps to the same conflict.
    let err = Books::delete_by_id(book.id)
        .exec(&state.orm)
        .await
        .map_err(|e| AppError::restricted(e, "Cannot delete book with associated purchases."))
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m.contains("associated purchases")));

    // Valid token but no file on disk.
    let bare = create_book(&state, "Not Uploaded Yet", Decimal::new(500, 2)).await?;
    let pending = purchase_service::create_purchase(&state, None, purchase_request(bare.id, "gateway"))
        .await?
        .data
        .unwrap();
    let err = download_service::resolve_download(&state, &pending.download_token, state.clock.now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AssetUnavailable));
    let (status, body) = error_body(err).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "The book file is not available at this moment.");

    // Tokens are unique across the ledger.
    let tokens: Vec<String> = Purchases::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| p.download_token)
        .collect();
    let distinct: HashSet<&String> = tokens.iter().collect();
    assert_eq!(distinct.len(), tokens.len());

    Ok(())
}
