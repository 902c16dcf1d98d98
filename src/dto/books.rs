use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Author, Book, Faq, Testimonial},
    routes::params::Pagination,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateBookRequest {
    pub author_id: Option<Uuid>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "19.99")]
    pub price: Option<Decimal>,
    pub cover_image: Option<String>,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateBookRequest {
    pub author_id: Option<Uuid>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "24.50")]
    pub price: Option<Decimal>,
    pub cover_image: Option<String>,
    /// Clears the stored cover path.
    pub remove_cover_image: bool,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub author_filter: Option<Uuid>,
}

impl BookListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookList {
    pub items: Vec<Book>,
}

/// A book with everything the storefront page renders.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub testimonials: Vec<Testimonial>,
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DigitalBookUploaded {
    pub book_id: Uuid,
    pub bytes: usize,
}
