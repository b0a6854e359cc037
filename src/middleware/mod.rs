//! Request middleware: authentication extractor and role guard

pub mod auth;
pub mod role_guard;

pub use auth::AuthUser;
pub use role_guard::role_guard;
