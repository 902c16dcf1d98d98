use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        authors::{AuthorList, AuthorWithBooks, CreateAuthorRequest, UpdateAuthorRequest},
        books::{BookDetail, BookList, CreateBookRequest, DigitalBookUploaded, UpdateBookRequest},
        faqs::{CreateFaqRequest, FaqList, ReorderFaqsRequest, UpdateFaqRequest},
        purchases::{
            BookSales, CreatePurchaseRequest, PurchaseCreated, PurchaseList, PurchaseOutcome,
            PurchaseStatistics, PurchaseWithBook, RegeneratedToken, UpdatePurchaseRequest,
        },
        testimonials::{CreateTestimonialRequest, TestimonialList, UpdateTestimonialRequest},
    },
    models::{Author, Book, Faq, Purchase, Testimonial, User},
    payment::PaymentMethod,
    response::{ApiResponse, Meta},
    routes::{
        auth, authors, books, download, faqs, health, params, purchases, testimonials,
    },
    validation::FieldErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        books::list_books,
        books::get_book,
        books::landing_page,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::upload_digital_book,
        books::book_testimonials,
        books::book_faqs,
        books::reorder_faqs,
        testimonials::list_testimonials,
        testimonials::get_testimonial,
        testimonials::create_testimonial,
        testimonials::update_testimonial,
        testimonials::delete_testimonial,
        faqs::list_faqs,
        faqs::get_faq,
        faqs::create_faq,
        faqs::update_faq,
        faqs::delete_faq,
        purchases::create_purchase,
        purchases::list_purchases,
        purchases::purchase_statistics,
        purchases::get_purchase,
        purchases::update_purchase,
        purchases::delete_purchase,
        purchases::regenerate_token,
        download::download
    ),
    components(
        schemas(
            User,
            Author,
            Book,
            Testimonial,
            Faq,
            Purchase,
            PaymentMethod,
            FieldErrors,
            LoginRequest,
            LoginResponse,
            AuthorList,
            AuthorWithBooks,
            CreateAuthorRequest,
            UpdateAuthorRequest,
            BookList,
            BookDetail,
            CreateBookRequest,
            UpdateBookRequest,
            DigitalBookUploaded,
            books::DigitalBookForm,
            TestimonialList,
            CreateTestimonialRequest,
            UpdateTestimonialRequest,
            FaqList,
            CreateFaqRequest,
            UpdateFaqRequest,
            ReorderFaqsRequest,
            CreatePurchaseRequest,
            PurchaseCreated,
            PurchaseOutcome,
            PurchaseList,
            PurchaseWithBook,
            UpdatePurchaseRequest,
            RegeneratedToken,
            BookSales,
            PurchaseStatistics,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Book>,
            ApiResponse<BookDetail>,
            ApiResponse<PurchaseCreated>,
            ApiResponse<PurchaseList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Administrator login"),
        (name = "Authors", description = "Author catalog"),
        (name = "Books", description = "Book catalog, digital files and landing page"),
        (name = "Testimonials", description = "Reader testimonials"),
        (name = "FAQs", description = "Per-book frequently asked questions"),
        (name = "Purchases", description = "Purchase intake and back-office"),
        (name = "Download", description = "Token-gated book downloads"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
