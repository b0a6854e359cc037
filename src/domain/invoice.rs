//! Invoice domain model

use crate::domain::{Product, StringUuid, User};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::non_negative;

/// Invoice lifecycle status. Stored lowercase in the `invoices.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    /// Parse a single status token
    pub fn parse(s: &str) -> Option<InvoiceStatus> {
        match s.trim() {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice entity. Party columns are nullable because deleting a user
/// detaches their invoices instead of removing them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: StringUuid,
    pub seller_id: Option<StringUuid>,
    pub client_id: Option<StringUuid>,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice line item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvoiceItem {
    pub id: StringUuid,
    pub invoice_id: StringUuid,
    pub product_id: StringUuid,
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item joined with its product
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: InvoiceItem,
    pub product: Product,
}

/// Invoice with its parties and line items eager-loaded
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub seller: Option<User>,
    pub client: Option<User>,
    pub items: Vec<ItemDetail>,
}

/// Validated invoice header ready for insertion
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub seller_id: StringUuid,
    pub client_id: StringUuid,
    pub status: InvoiceStatus,
}

/// Validated line item ready for insertion
#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub product_id: StringUuid,
    pub quantity: Decimal,
    pub total_price: Decimal,
}

/// Column-level changes applied by the repository. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub seller_id: Option<StringUuid>,
    pub client_id: Option<StringUuid>,
    pub status: Option<InvoiceStatus>,
}

/// Line item as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemInput {
    /// Must reference an existing product; checked by the service
    pub product_id: String,

    #[validate(range(min = 1, message = "The quantity must be at least 1."))]
    pub quantity: i64,

    #[validate(custom(
        function = "non_negative",
        message = "The total price must be at least 0."
    ))]
    pub total_price: Decimal,
}

/// Input for creating an invoice with its line items
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceInput {
    /// Must reference an existing seller; checked by the service
    pub seller_id: String,

    /// Must reference an existing client; checked by the service
    pub client_id: String,

    /// Status token; defaults to draft when absent
    pub status: Option<String>,

    #[validate(length(min = 1, message = "The items field is required."))]
    #[validate]
    pub items: Vec<InvoiceItemInput>,
}

/// Input for updating an invoice. Supplying `items` replaces the full set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInvoiceInput {
    pub seller_id: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<String>,

    #[validate(length(min = 1, message = "The items field is required."))]
    #[validate]
    pub items: Option<Vec<InvoiceItemInput>>,
}

/// Input for the dedicated status update operation
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}
