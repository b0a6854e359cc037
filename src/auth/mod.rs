//! Token issuing/verification and password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtManager};
