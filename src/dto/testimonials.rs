use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Testimonial, routes::params::Pagination};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTestimonialRequest {
    pub book_id: Option<Uuid>,
    pub name: Option<String>,
    pub text: Option<String>,
    /// 1 to 5, defaults to 5.
    pub rating: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateTestimonialRequest {
    pub book_id: Option<Uuid>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestimonialListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub book_filter: Option<Uuid>,
}

impl TestimonialListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestimonialList {
    pub items: Vec<Testimonial>,
}
