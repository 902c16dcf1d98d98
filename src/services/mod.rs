pub mod admin_service;
pub mod auth_service;
pub mod author_service;
pub mod book_service;
pub mod download_service;
pub mod faq_service;
pub mod purchase_service;
pub mod testimonial_service;
