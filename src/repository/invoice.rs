//! Invoice repository
//!
//! Detail queries eager-load the seller, client and line items (with
//! their products) so handlers can return a fully expanded invoice.

use crate::domain::{
    Invoice, InvoiceChanges, InvoiceDetail, InvoiceItem, InvoiceStatus, ItemDetail, NewInvoice,
    NewInvoiceItem, Product, StringUuid, User,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

const INVOICE_COLUMNS: &str = "id, seller_id, client_id, status, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn create(&self, input: &NewInvoice) -> Result<Invoice>;
    async fn insert_items(&self, invoice_id: StringUuid, items: &[NewInvoiceItem]) -> Result<()>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Invoice>>;
    async fn find_detailed(&self, id: StringUuid) -> Result<Option<InvoiceDetail>>;
    async fn list(&self) -> Result<Vec<Invoice>>;
    async fn list_by_status(&self, status: InvoiceStatus) -> Result<Vec<InvoiceDetail>>;
    async fn list_by_seller(&self, seller_id: StringUuid) -> Result<Vec<InvoiceDetail>>;
    async fn list_by_client(&self, client_id: StringUuid) -> Result<Vec<InvoiceDetail>>;
    async fn update(&self, id: StringUuid, changes: &InvoiceChanges) -> Result<Invoice>;
    async fn delete_items(&self, invoice_id: StringUuid) -> Result<()>;
    async fn delete(&self, id: StringUuid) -> Result<()>;
}

pub struct InvoiceRepositoryImpl {
    pool: MySqlPool,
}

impl InvoiceRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_party(&self, id: Option<StringUuid>) -> Result<Option<User>> {
        let Some(id) = id else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, phone, address, role, is_active, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn load_items(&self, invoice_id: StringUuid) -> Result<Vec<ItemDetail>> {
        let rows = sqlx::query_as::<_, ItemWithProductRow>(
            r#"
            SELECT i.id, i.invoice_id, i.product_id, i.quantity, i.total_price,
                   i.created_at, i.updated_at,
                   p.id AS p_id, p.name AS p_name, p.description AS p_description,
                   p.unit_price AS p_unit_price, p.created_at AS p_created_at,
                   p.updated_at AS p_updated_at
            FROM invoice_items i
            INNER JOIN products p ON p.id = i.product_id
            WHERE i.invoice_id = ?
            ORDER BY i.created_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItemDetail::from).collect())
    }

    async fn load_detail(&self, invoice: Invoice) -> Result<InvoiceDetail> {
        let seller = self.find_party(invoice.seller_id).await?;
        let client = self.find_party(invoice.client_id).await?;
        let items = self.load_items(invoice.id).await?;

        Ok(InvoiceDetail {
            invoice,
            seller,
            client,
            items,
        })
    }

    async fn load_details(&self, invoices: Vec<Invoice>) -> Result<Vec<InvoiceDetail>> {
        let mut details = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            details.push(self.load_detail(invoice).await?);
        }
        Ok(details)
    }
}

/// Flat row for the line item + product join
#[derive(sqlx::FromRow)]
struct ItemWithProductRow {
    id: StringUuid,
    invoice_id: StringUuid,
    product_id: StringUuid,
    quantity: Decimal,
    total_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    p_id: StringUuid,
    p_name: String,
    p_description: Option<String>,
    p_unit_price: Decimal,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
}

impl From<ItemWithProductRow> for ItemDetail {
    fn from(row: ItemWithProductRow) -> Self {
        ItemDetail {
            item: InvoiceItem {
                id: row.id,
                invoice_id: row.invoice_id,
                product_id: row.product_id,
                quantity: row.quantity,
                total_price: row.total_price,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            product: Product {
                id: row.p_id,
                name: row.p_name,
                description: row.p_description,
                unit_price: row.p_unit_price,
                created_at: row.p_created_at,
                updated_at: row.p_updated_at,
            },
        }
    }
}

#[async_trait]
impl InvoiceRepository for InvoiceRepositoryImpl {
    async fn create(&self, input: &NewInvoice) -> Result<Invoice> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO invoices (id, seller_id, client_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(input.seller_id)
        .bind(input.client_id)
        .bind(input.status)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create invoice")))
    }

    async fn insert_items(&self, invoice_id: StringUuid, items: &[NewInvoiceItem]) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (id, invoice_id, product_id, quantity, total_price, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, NOW(), NOW())
                "#,
            )
            .bind(StringUuid::new_v4())
            .bind(invoice_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.total_price)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE id = ?",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn find_detailed(&self, id: StringUuid) -> Result<Option<InvoiceDetail>> {
        match self.find_by_id(id).await? {
            Some(invoice) => Ok(Some(self.load_detail(invoice).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    async fn list_by_status(&self, status: InvoiceStatus) -> Result<Vec<InvoiceDetail>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE status = ? ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.load_details(invoices).await
    }

    async fn list_by_seller(&self, seller_id: StringUuid) -> Result<Vec<InvoiceDetail>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE seller_id = ? ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        self.load_details(invoices).await
    }

    async fn list_by_client(&self, client_id: StringUuid) -> Result<Vec<InvoiceDetail>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE client_id = ? ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        self.load_details(invoices).await
    }

    async fn update(&self, id: StringUuid, changes: &InvoiceChanges) -> Result<Invoice> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET seller_id = COALESCE(?, seller_id),
                client_id = COALESCE(?, client_id),
                status = COALESCE(?, status),
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(changes.seller_id)
        .bind(changes.client_id)
        .bind(changes.status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
    }

    async fn delete_items(&self, invoice_id: StringUuid) -> Result<()> {
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(invoice_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Invoice not found".to_string()));
        }

        Ok(())
    }
}
