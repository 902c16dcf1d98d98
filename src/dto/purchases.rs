use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Book, Purchase},
    routes::params::{Pagination, SortOrder},
};

/// Buyer input for the public purchase form. Every field is optional at the
/// wire level so missing values surface as field errors.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreatePurchaseRequest {
    pub book_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// One of `gateway`, `messaging-handoff`, `manual`.
    pub payment_method: Option<String>,
}

/// What the buyer does next, per payment method.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PurchaseOutcome {
    Gateway {
        payment_id: String,
        download_url: String,
    },
    MessagingHandoff {
        messaging_url: String,
        purchase_id: Uuid,
    },
    Manual {
        payment_id: String,
        download_url: String,
    },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseCreated {
    pub purchase: Purchase,
    pub download_token: String,
    pub outcome: PurchaseOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegeneratedToken {
    pub purchase: Purchase,
    pub download_token: String,
    pub download_url: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePurchaseRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub payment_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub book_filter: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

impl PurchaseListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseList {
    pub items: Vec<Purchase>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseWithBook {
    pub purchase: Purchase,
    pub book: Option<Book>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookSales {
    pub book_id: Uuid,
    pub title: Option<String>,
    pub purchases: i64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseStatistics {
    pub total_purchases: i64,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    pub total_downloads: i64,
    pub purchases_by_book: Vec<BookSales>,
    pub recent_purchases: Vec<Purchase>,
}
