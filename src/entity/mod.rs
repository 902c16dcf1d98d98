pub mod audit_logs;
pub mod authors;
pub mod books;
pub mod faqs;
pub mod purchases;
pub mod testimonials;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use authors::Entity as Authors;
pub use books::Entity as Books;
pub use faqs::Entity as Faqs;
pub use purchases::Entity as Purchases;
pub use testimonials::Entity as Testimonials;
pub use users::Entity as Users;
