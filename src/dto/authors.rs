use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Author, Book},
    routes::params::Pagination,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateAuthorRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateAuthorRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Clears the stored image path.
    pub remove_image: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthorListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Only authors of this book.
    pub book_filter: Option<Uuid>,
}

impl AuthorListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorList {
    pub items: Vec<Author>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorWithBooks {
    pub author: Author,
    pub books: Vec<Book>,
}
