use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Faq, routes::params::Pagination};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateFaqRequest {
    pub book_id: Option<Uuid>,
    pub question: Option<String>,
    pub answer: Option<String>,
    /// Appended after the book's last FAQ when omitted.
    pub position: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateFaqRequest {
    pub book_id: Option<Uuid>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderFaqsRequest {
    /// FAQ ids in their new display order.
    pub faq_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FaqListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub book_filter: Option<Uuid>,
}

impl FaqListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FaqList {
    pub items: Vec<Faq>,
}
