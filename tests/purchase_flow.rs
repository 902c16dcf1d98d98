mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::IntoResponse,
};
use bookstore_api::{
    dto::purchases::{CreatePurchaseRequest, PurchaseOutcome},
    entity::{books, purchases::Entity as Purchases},
    error::AppError,
    payment::PaymentMethod,
    routes::build_router,
    services::{admin_service, download_service, purchase_service},
    state::AppState,
    token::{TOKEN_LEN, token_ttl},
};
use chrono::Duration;
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
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

// Gateway purchase -> download inside the window -> expiry -> regenerate.
#[tokio::test]
async fn purchase_download_and_token_lifecycle() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let storage = tempfile::tempdir()?;
    let state = setup_state(&database_url, storage.path()).await?;
    let admin = admin();

    let book = create_book(&state, "The Async Book!", Decimal::new(1999, 2)).await?;
    state.assets.store_digital_book(book.id, PDF_BYTES).await?;

    // Intake through the simulated gateway.
    let created = purchase_service::create_purchase(&state, None, purchase_request(book.id, "gateway"))
        .await?
        .data
        .unwrap();
    let purchase = created.purchase;
    let token = created.download_token;

    assert_eq!(token.len(), TOKEN_LEN);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(purchase.download_token.as_deref(), Some(token.as_str()));
    assert_eq!(purchase.price_paid, Decimal::new(1999, 2));
    assert_eq!(purchase.payment_method, PaymentMethod::Gateway);
    assert_eq!(purchase.created_at, fixed_now());
    assert_eq!(purchase.token_expires_at, fixed_now() + token_ttl());
    assert!(!purchase.downloaded);

    let PurchaseOutcome::Gateway {
        payment_id,
        download_url,
    } = created.outcome
    else {
        panic!("expected gateway outcome");
    };
    assert!(payment_id.starts_with("MP_"));
    assert_eq!(payment_id.len(), 13);
    assert_eq!(purchase.payment_id.as_deref(), Some(payment_id.as_str()));
    assert_eq!(download_url, format!("http://books.test/api/download/{token}"));

    // One second before expiry the token still works.
    state.clock.set(purchase.token_expires_at - Duration::seconds(1));
    let asset = download_service::resolve_download(&state, &token, state.clock.now()).await?;
    assert_eq!(asset.filename, "the-async-book.pdf");
    assert_eq!(asset.bytes, PDF_BYTES);

    let stored = Purchases::find_by_id(purchase.id).one(&state.orm).await?.unwrap();
    assert!(stored.downloaded);

    // Repeat downloads are allowed and keep the flag set.
    download_service::resolve_download(&state, &token, state.clock.now()).await?;
    let stored = Purchases::find_by_id(purchase.id).one(&state.orm).await?.unwrap();
    assert!(stored.downloaded);

    // At the expiry instant the token is rejected, same as a token never issued.
    state.clock.set(purchase.token_expires_at);
    let expired = download_service::resolve_download(&state, &token, state.clock.now())
        .await
        .unwrap_err();
    assert!(matches!(expired, AppError::DownloadDenied));
    let unknown = download_service::resolve_download(&state, &"x".repeat(TOKEN_LEN), state.clock.now())
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::DownloadDenied));

    let (expired_status, expired_body) = error_body(expired).await;
    let (unknown_status, unknown_body) = error_body(unknown).await;
    assert_eq!(expired_status, 404);
    assert_eq!(expired_status, unknown_status);
    assert_eq!(expired_body, unknown_body);
    assert_eq!(expired_body["success"], false);

    // Regeneration issues a fresh window and kills the old token.
    state.clock.set(fixed_now() + Duration::hours(1));
    let regenerated = admin_service::regenerate_token(&state, &admin, purchase.id)
        .await?
        .data
        .unwrap();
    assert_ne!(regenerated.download_token, token);
    assert_eq!(
        regenerated.purchase.token_expires_at,
        state.clock.now() + token_ttl()
    );
    assert!(regenerated.download_url.ends_with(&regenerated.download_token));

    let old = download_service::resolve_download(&state, &token, state.clock.now())
        .await
        .unwrap_err();
    assert!(matches!(old, AppError::DownloadDenied));
    download_service::resolve_download(&state, &regenerated.download_token, state.clock.now())
        .await?;

    // Same database, so the HTTP round trip runs in this test rather than racing another.
    purchase_and_download_over_http(&state, &book).await
}

async fn purchase_and_download_over_http(state: &AppState, book: &books::Model) -> anyhow::Result<()> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/purchases")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "book_id": book.id,
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "payment_method": "gateway",
            })
            .to_string(),
        ))?;
    let response = build_router(state.clone()).oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], true);
    let token = body["data"]["download_token"]
        .as_str()
        .expect("download token in intake response")
        .to_string();

    let request = Request::builder()
        .uri(format!("/api/download/{token}"))
        .body(Body::empty())?;
    let response = build_router(state.clone()).oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        download_service::PDF_CONTENT_TYPE
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"the-async-book.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(bytes.as_ref(), PDF_BYTES);

    Ok(())
}
