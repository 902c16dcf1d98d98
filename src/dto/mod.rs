pub mod auth;
pub mod authors;
pub mod books;
pub mod faqs;
pub mod purchases;
pub mod testimonials;
