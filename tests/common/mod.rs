#![allow(dead_code)]

use std::path::Path;

use bookstore_api::{
    clock::Clock,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{authors, books},
    middleware::auth::{ADMIN_ROLE, AuthUser},
    payment::GatewayMode,
    state::AppState,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, Statement};
use uuid::Uuid;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% test book\n%%EOF\n";

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            None
        }
    }
}

pub fn test_config(database_url: &str, storage_root: &Path) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "test-secret".into(),
        storage_root: storage_root.to_path_buf(),
        public_base_url: "http://books.test".into(),
        messaging_phone: "5511999999999".into(),
        payment_gateway: GatewayMode::Simulated,
        max_upload_bytes: 1024 * 1024,
    }
}

/// A whole-second instant so values survive a round trip through `TIMESTAMPTZ`.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

pub async fn setup_state(database_url: &str, storage_root: &Path) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    truncate(&orm).await?;

    let state = AppState::new(orm, test_config(database_url, storage_root))
        .with_clock(Clock::manual(fixed_now()));
    Ok(state)
}

async fn truncate(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE purchases, faqs, testimonials, books, authors, audit_logs, users CASCADE",
    ))
    .await?;
    Ok(())
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ADMIN_ROLE.into(),
    }
}

pub async fn create_book(
    state: &AppState,
    title: &str,
    price: Decimal,
) -> anyhow::Result<books::Model> {
    let now = state.clock.now();
    let author = authors::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Test Author".into()),
        bio: Set("Writes test fixtures.".into()),
        image: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    let book = books::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(author.id),
        title: Set(title.into()),
        subtitle: Set(None),
        description: Set("A book used in tests.".into()),
        price: Set(price),
        cover_image: Set(None),
        features: Set(serde_json::json!(["one", "two"])),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(book)
}
