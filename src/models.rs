use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    authors::Model as AuthorModel, books::Model as BookModel, faqs::Model as FaqModel,
    purchases::Model as PurchaseModel, testimonials::Model as TestimonialModel,
    users::Model as UserModel,
};
use crate::payment::PaymentMethod;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub price: Decimal,
    pub cover_image: Option<String>,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Testimonial {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Faq {
    pub id: Uuid,
    pub book_id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub price_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    /// Omitted from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_token: Option<String>,
    pub token_expires_at: DateTime<Utc>,
    pub downloaded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    pub fn redacted(mut self) -> Self {
        self.download_token = None;
        self
    }
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<AuthorModel> for Author {
    fn from(model: AuthorModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            bio: model.bio,
            image: model.image,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<BookModel> for Book {
    fn from(model: BookModel) -> Self {
        let features = serde_json::from_value(model.features).unwrap_or_default();
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            subtitle: model.subtitle,
            description: model.description,
            price: model.price,
            cover_image: model.cover_image,
            features,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<TestimonialModel> for Testimonial {
    fn from(model: TestimonialModel) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            name: model.name,
            text: model.text,
            rating: model.rating,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<FaqModel> for Faq {
    fn from(model: FaqModel) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            question: model.question,
            answer: model.answer,
            position: model.position,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<PurchaseModel> for Purchase {
    fn from(model: PurchaseModel) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            price_paid: model.price_paid,
            payment_method: model.payment_method,
            payment_id: model.payment_id,
            download_token: Some(model.download_token),
            token_expires_at: model.token_expires_at.with_timezone(&Utc),
            downloaded: model.downloaded,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
