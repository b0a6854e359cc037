//! Facturo Core - Invoicing Service Backend
//!
//! This crate provides the backend for the Facturo invoicing service:
//! a role-gated REST API over users, products and invoices.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod notify;
pub mod repository;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
