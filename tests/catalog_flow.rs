mod common;

use bookstore_api::{
    dto::{
        authors::CreateAuthorRequest,
        books::CreateBookRequest,
        faqs::{CreateFaqRequest, ReorderFaqsRequest},
        purchases::{CreatePurchaseRequest, PurchaseListQuery, UpdatePurchaseRequest},
        testimonials::CreateTestimonialRequest,
    },
    error::AppError,
    services::{
        admin_service, author_service, book_service, download_service, faq_service,
        purchase_service, testimonial_service,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

use common::{PDF_BYTES, admin, database_url, setup_state};

// Admin builds a catalog, sells it, and reviews the back-office views.
#[tokio::test]
async fn catalog_and_back_office_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let storage = tempfile::tempdir()?;
    let state = setup_state(&database_url, storage.path()).await?;
    let admin = admin();

    let author = author_service::create_author(
        &state,
        &admin,
        CreateAuthorRequest {
            name: Some("Octavia Example".into()),
            bio: Some("Writes about craft.".into()),
            image: None,
        },
    )
    .await?
    .data
    .unwrap();

    let err = book_service::create_book(
        &state,
        &admin,
        CreateBookRequest {
            author_id: Some(Uuid::new_v4()),
            title: Some("Orphan".into()),
            description: Some("No author".into()),
            price: Some(Decimal::new(-1, 0)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    let AppError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.contains("author_id"));
    assert!(errors.contains("price"));

    let book = book_service::create_book(
        &state,
        &admin,
        CreateBookRequest {
            author_id: Some(author.id),
            title: Some("Craft Notes".into()),
            description: Some("Essays on writing.".into()),
            price: Some(Decimal::new(1500, 2)),
            features: Some(vec!["Ten essays".into(), "Exercises".into()]),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(book.features, vec!["Ten essays", "Exercises"]);

    // Upload only accepts PDFs.
    let err = book_service::upload_digital_book(
        &state,
        &admin,
        book.id,
        Some("notes.txt".into()),
        b"plain text".to_vec(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("digital_book")));
    let uploaded = book_service::upload_digital_book(
        &state,
        &admin,
        book.id,
        Some("craft-notes.pdf".into()),
        PDF_BYTES.to_vec(),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(uploaded.bytes, PDF_BYTES.len());
    assert!(state.assets.has_digital_book(book.id).await);

    // Testimonials default to five stars and reject out-of-range ratings.
    let testimonial = testimonial_service::create_testimonial(
        &state,
        &admin,
        CreateTestimonialRequest {
            book_id: Some(book.id),
            name: Some("Reader".into()),
            text: Some("Loved it".into()),
            rating: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(testimonial.rating, 5);
    let err = testimonial_service::create_testimonial(
        &state,
        &admin,
        CreateTestimonialRequest {
            book_id: Some(book.id),
            name: Some("Critic".into()),
            text: Some("Meh".into()),
            rating: Some(6),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("rating")));

    // FAQs append by position and can be reordered.
    let mut faq_ids = Vec::new();
    for (i, question) in ["First?", "Second?", "Third?"].into_iter().enumerate() {
        let faq = faq_service::create_faq(
            &state,
            &admin,
            CreateFaqRequest {
                book_id: Some(book.id),
                question: Some(question.into()),
                answer: Some("Yes.".into()),
                position: None,
            },
        )
        .await?
        .data
        .unwrap();
        assert_eq!(faq.position, i as i32);
        faq_ids.push(faq.id);
    }
    faq_ids.reverse();
    let reordered = faq_service::reorder_faqs(
        &state,
        &admin,
        book.id,
        ReorderFaqsRequest {
            faq_ids: faq_ids.clone(),
        },
    )
    .await?
    .data
    .unwrap();
    let order: Vec<Uuid> = reordered.items.iter().map(|f| f.id).collect();
    assert_eq!(order, faq_ids);

    let err = faq_service::reorder_faqs(
        &state,
        &admin,
        book.id,
        ReorderFaqsRequest {
            faq_ids: vec![Uuid::new_v4()],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let landing = book_service::landing_page(&state).await?.data.unwrap();
    assert_eq!(landing.book.id, book.id);
    assert_eq!(landing.author.map(|a| a.id), Some(author.id));
    assert_eq!(landing.testimonials.len(), 1);
    assert_eq!(landing.faqs.first().map(|f| f.question.as_str()), Some("Third?"));

    // An author with books cannot be removed.
    let err = author_service::delete_author(&state, &admin, author.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Two sales, one downloaded.
    let mut tokens = Vec::new();
    for email in ["one@example.com", "two@example.com"] {
        let created = purchase_service::create_purchase(
            &state,
            None,
            CreatePurchaseRequest {
                book_id: Some(book.id),
                name: Some("Buyer".into()),
                email: Some(email.into()),
                phone: None,
                payment_method: Some("gateway".into()),
            },
        )
        .await?
        .data
        .unwrap();
        tokens.push((created.purchase.id, created.download_token));
    }
    download_service::resolve_download(&state, &tokens[0].1, state.clock.now()).await?;

    let listing = admin_service::list_purchases(
        &state,
        &admin,
        PurchaseListQuery {
            page: None,
            per_page: None,
            book_filter: Some(book.id),
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(listing.meta.as_ref().and_then(|m| m.total), Some(2));
    let items = listing.data.unwrap().items;
    assert!(items.iter().all(|p| p.download_token.is_none()));

    let shown = admin_service::get_purchase(&state, &admin, tokens[0].0)
        .await?
        .data
        .unwrap();
    assert_eq!(shown.book.map(|b| b.id), Some(book.id));
    assert_eq!(shown.purchase.download_token.as_deref(), Some(tokens[0].1.as_str()));

    // Contact corrections never touch price or download state.
    let updated = admin_service::update_purchase(
        &state,
        &admin,
        tokens[0].0,
        UpdatePurchaseRequest {
            email: Some("fixed@example.com".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.email, "fixed@example.com");
    assert_eq!(updated.price_paid, Decimal::new(1500, 2));
    assert!(updated.downloaded);

    let stats = admin_service::purchase_statistics(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(stats.total_purchases, 2);
    assert_eq!(stats.total_revenue, Decimal::new(3000, 2));
    assert_eq!(stats.total_downloads, 1);
    assert_eq!(stats.purchases_by_book.len(), 1);
    assert_eq!(stats.purchases_by_book[0].title.as_deref(), Some("Craft Notes"));
    assert_eq!(stats.recent_purchases.len(), 2);

    admin_service::delete_purchase(&state, &admin, tokens[1].0).await?;
    let err = admin_service::delete_purchase(&state, &admin, tokens[1].0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
