//! Business logic

pub mod auth;
pub mod invoice;
pub mod product;
pub mod user;

pub use auth::{AuthService, LoginOutcome};
pub use invoice::InvoiceService;
pub use product::ProductService;
pub use user::UserService;
