//! Data access layer

pub mod invoice;
pub mod product;
pub mod user;

pub use invoice::{InvoiceRepository, InvoiceRepositoryImpl};
pub use product::{ProductRepository, ProductRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};

#[cfg(test)]
pub use invoice::MockInvoiceRepository;
#[cfg(test)]
pub use product::MockProductRepository;
#[cfg(test)]
pub use user::MockUserRepository;
