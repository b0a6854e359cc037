//! Product repository

use crate::domain::{NewProduct, Product, ProductChanges, StringUuid};
use crate::error::{map_unique_violation, AppError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

const PRODUCT_COLUMNS: &str = "id, name, description, unit_price, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: &NewProduct) -> Result<Product>;
    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Product>>;
    async fn list(&self) -> Result<Vec<Product>>;
    async fn name_taken(&self, name: &str, exclude: Option<StringUuid>) -> Result<bool>;
    async fn update(&self, id: StringUuid, changes: &ProductChanges) -> Result<Product>;
    async fn delete(&self, id: StringUuid) -> Result<()>;
    async fn search(&self, term: &str) -> Result<Vec<Product>>;
    async fn find_by_price_range(&self, min: Decimal, max: Decimal) -> Result<Vec<Product>>;
    async fn most_expensive(&self, limit: i64) -> Result<Vec<Product>>;
    async fn cheapest(&self, limit: i64) -> Result<Vec<Product>>;
    /// Number of invoice line items referencing the product
    async fn count_invoice_items(&self, product_id: StringUuid) -> Result<i64>;
}

pub struct ProductRepositoryImpl {
    pool: MySqlPool,
}

impl ProductRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn create(&self, input: &NewProduct) -> Result<Product> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, unit_price, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit_price)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "name", "The name has already been taken."))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create product")))
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn name_taken(&self, name: &str, exclude: Option<StringUuid>) -> Result<bool> {
        let row: (i64,) = match exclude {
            Some(id) => {
                sqlx::query_as("SELECT COUNT(*) FROM products WHERE name = ? AND id != ?")
                    .bind(name)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM products WHERE name = ?")
                    .bind(name)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(row.0 > 0)
    }

    async fn update(&self, id: StringUuid, changes: &ProductChanges) -> Result<Product> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                unit_price = COALESCE(?, unit_price),
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.unit_price)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "name", "The name has already been taken."))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn delete(&self, id: StringUuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        Ok(())
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>> {
        let pattern = format!("%{}%", term);
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE name LIKE ? OR description LIKE ? ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_price_range(&self, min: Decimal, max: Decimal) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE unit_price BETWEEN ? AND ? ORDER BY unit_price",
            PRODUCT_COLUMNS
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn most_expensive(&self, limit: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY unit_price DESC LIMIT ?",
            PRODUCT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn cheapest(&self, limit: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY unit_price ASC LIMIT ?",
            PRODUCT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn count_invoice_items(&self, product_id: StringUuid) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM invoice_items WHERE product_id = ?")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
