//! Entity lifecycle notifications
//!
//! Services announce create/update/delete events through a
//! [`LifecycleNotifier`]. The default implementation writes structured
//! log lines; alternative sinks can be plugged in without touching the
//! services.

use crate::domain::{Invoice, Product, User};
use tracing::info;

/// Observer for entity lifecycle events
pub trait LifecycleNotifier: Send + Sync {
    fn user_created(&self, user: &User);
    fn user_updated(&self, user: &User);
    fn user_deleted(&self, user: &User);

    fn product_created(&self, product: &Product);
    fn product_updated(&self, product: &Product);
    fn product_deleted(&self, product: &Product);

    fn invoice_created(&self, invoice: &Invoice);
    fn invoice_updated(&self, invoice: &Invoice);
    fn invoice_deleted(&self, invoice: &Invoice);
}

/// Notifier that logs lifecycle events via `tracing`
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

fn invoice_party(id: &Option<crate::domain::StringUuid>) -> String {
    id.as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl LifecycleNotifier for TracingNotifier {
    fn user_created(&self, user: &User) {
        info!("User({}) has been created", user.email);
    }

    fn user_updated(&self, user: &User) {
        info!("User({}) has been updated", user.email);
    }

    fn user_deleted(&self, user: &User) {
        info!("User({}) has been deleted", user.email);
    }

    fn product_created(&self, product: &Product) {
        info!(
            "Product({}: {} $) has been created",
            product.name, product.unit_price
        );
    }

    fn product_updated(&self, product: &Product) {
        info!(
            "Product({}: {} $) has been updated",
            product.name, product.unit_price
        );
    }

    fn product_deleted(&self, product: &Product) {
        info!(
            "Product({}: {} $) has been deleted",
            product.name, product.unit_price
        );
    }

    fn invoice_created(&self, invoice: &Invoice) {
        info!(
            "Invoice(seller_id: {}, client_id: {}) has been created",
            invoice_party(&invoice.seller_id),
            invoice_party(&invoice.client_id)
        );
    }

    fn invoice_updated(&self, invoice: &Invoice) {
        info!(
            "Invoice(seller_id: {}, client_id: {}) has been updated",
            invoice_party(&invoice.seller_id),
            invoice_party(&invoice.client_id)
        );
    }

    fn invoice_deleted(&self, invoice: &Invoice) {
        info!(
            "Invoice(seller_id: {}, client_id: {}) has been deleted",
            invoice_party(&invoice.seller_id),
            invoice_party(&invoice.client_id)
        );
    }
}
