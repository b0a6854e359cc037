//! Domain models

pub mod common;
pub mod invoice;
pub mod product;
pub mod user;

pub use common::StringUuid;
pub use invoice::{
    CreateInvoiceInput, Invoice, InvoiceChanges, InvoiceDetail, InvoiceItem, InvoiceItemInput,
    InvoiceStatus, ItemDetail, NewInvoice, NewInvoiceItem, UpdateInvoiceInput, UpdateStatusInput,
};
pub use product::{CreateProductInput, NewProduct, Product, ProductChanges, UpdateProductInput};
pub use user::{
    CreateUserInput, NewUser, RegisterInput, Role, UpdateUserInput, User, UserChanges, UserSummary,
};
