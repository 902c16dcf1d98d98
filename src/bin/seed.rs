use bookstore_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{authors, books, faqs, testimonials},
    middleware::auth::ADMIN_ROLE,
    services::auth_service::upsert_user,
    storage::AssetStore,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

const PLACEHOLDER_PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\ntrailer << /Root 1 0 R >>\n%%EOF\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let email = std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin = upsert_user(&orm, &email, &password, ADMIN_ROLE).await?;

    let book_id = seed_catalog(&orm).await?;

    let assets = AssetStore::new(config.storage_root.clone());
    if !assets.has_digital_book(book_id).await {
        let path = assets.store_digital_book(book_id, PLACEHOLDER_PDF).await?;
        println!("Stored placeholder digital book at {}", path.display());
    }

    println!("Seed completed. Admin ID: {}, Book ID: {book_id}", admin.id);
    Ok(())
}

/// Inserts a sample author, book, testimonials and FAQs unless a book already exists.
async fn seed_catalog(orm: &DatabaseConnection) -> anyhow::Result<Uuid> {
    if let Some(book) = books::Entity::find()
        .order_by_asc(books::Column::CreatedAt)
        .one(orm)
        .await?
    {
        println!("Catalog already seeded");
        return Ok(book.id);
    }

    let now = Utc::now();
    let author = authors::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Jane Writer".into()),
        bio: Set("Jane writes practical guides for independent creators.".into()),
        image: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    let book = books::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(author.id),
        title: Set("Selling Your First Digital Book".into()),
        subtitle: Set(Some("From manuscript to paying readers".into())),
        description: Set("A step-by-step guide to publishing and selling a digital book.".into()),
        price: Set(Decimal::new(1999, 2)),
        cover_image: Set(None),
        features: Set(serde_json::json!([
            "12 chapters",
            "Launch checklist",
            "Pricing worksheet"
        ])),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    let reviews = [
        ("Carlos M.", "Clear and actionable from the first page.", 5),
        ("Ana P.", "Helped me launch in a month.", 4),
    ];
    for (name, text, rating) in reviews {
        testimonials::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book.id),
            name: Set(name.into()),
            text: Set(text.into()),
            rating: Set(rating),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    let questions = [
        ("What format is the book?", "A PDF you can read on any device."),
        ("How long is the download link valid?", "Three days from purchase."),
    ];
    for (position, (question, answer)) in questions.into_iter().enumerate() {
        faqs::ActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book.id),
            question: Set(question.into()),
            answer: Set(answer.into()),
            position: Set(position as i32),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded catalog");
    Ok(book.id)
}
