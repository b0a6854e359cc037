//! Product business logic

use crate::domain::{
    CreateProductInput, NewProduct, Product, ProductChanges, StringUuid, UpdateProductInput,
};
use crate::error::{AppError, FieldErrors, Result};
use crate::notify::LifecycleNotifier;
use crate::repository::ProductRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use validator::Validate;

/// Cap for the expensive/cheap product listings
const PRICE_LIST_LIMIT: i64 = 10;

pub struct ProductService<R: ProductRepository> {
    repo: Arc<R>,
    notifier: Option<Arc<dyn LifecycleNotifier>>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: Arc<R>, notifier: Option<Arc<dyn LifecycleNotifier>>) -> Self {
        Self { repo, notifier }
    }

    pub async fn create(&self, input: CreateProductInput) -> Result<Product> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        if self.repo.name_taken(&input.name, None).await? {
            errors.add("name", "The name has already been taken.");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let product = self
            .repo
            .create(&NewProduct {
                name: input.name,
                description: input.description,
                unit_price: input.unit_price,
            })
            .await?;

        if let Some(notifier) = &self.notifier {
            notifier.product_created(&product);
        }

        Ok(product)
    }

    pub async fn get(&self, id: StringUuid) -> Result<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        self.repo.list().await
    }

    pub async fn update(&self, id: StringUuid, input: UpdateProductInput) -> Result<Product> {
        let _ = self.get(id).await?;

        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        if let Some(name) = &input.name {
            if self.repo.name_taken(name, Some(id)).await? {
                errors.add("name", "The name has already been taken.");
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let product = self
            .repo
            .update(
                id,
                &ProductChanges {
                    name: input.name,
                    description: input.description,
                    unit_price: input.unit_price,
                },
            )
            .await?;

        if let Some(notifier) = &self.notifier {
            notifier.product_updated(&product);
        }

        Ok(product)
    }

    /// Delete a product unless invoice line items still reference it
    pub async fn delete(&self, id: StringUuid) -> Result<()> {
        let product = self.get(id).await?;

        let in_use = self.repo.count_invoice_items(id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict {
                message: format!(
                    "Cannot delete product. It is used in {} invoice item(s).",
                    in_use
                ),
                details: Some(serde_json::json!({ "invoice_items_count": in_use })),
            });
        }

        self.repo.delete(id).await?;

        if let Some(notifier) = &self.notifier {
            notifier.product_deleted(&product);
        }

        Ok(())
    }

    /// Substring search over name and description
    pub async fn search(&self, term: &str) -> Result<Vec<Product>> {
        let mut errors = FieldErrors::new();
        if term.is_empty() {
            errors.add("query", "The query field is required.");
        } else if term.chars().count() < 2 {
            errors.add("query", "The query must be at least 2 characters.");
        } else if term.chars().count() > 255 {
            errors.add("query", "The query may not be greater than 255 characters.");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.repo.search(term).await
    }

    /// Filter by unit price. Bounds arrive as raw query strings so
    /// missing or non-numeric values land in the error map instead of
    /// being rejected at the extractor.
    pub async fn price_range(
        &self,
        min_raw: Option<&str>,
        max_raw: Option<&str>,
    ) -> Result<Vec<Product>> {
        let mut errors = FieldErrors::new();
        let min = parse_price(min_raw, "min_price", "min price", &mut errors);
        let max = parse_price(max_raw, "max_price", "max price", &mut errors);

        if let (Some(min), Some(max)) = (min, max) {
            if max < min {
                errors.add(
                    "max_price",
                    "The max price must be greater than or equal to min price.",
                );
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let min = min.ok_or_else(|| anyhow::anyhow!("min price missing after validation"))?;
        let max = max.ok_or_else(|| anyhow::anyhow!("max price missing after validation"))?;
        self.repo.find_by_price_range(min, max).await
    }

    pub async fn most_expensive(&self) -> Result<Vec<Product>> {
        self.repo.most_expensive(PRICE_LIST_LIMIT).await
    }

    pub async fn cheapest(&self) -> Result<Vec<Product>> {
        self.repo.cheapest(PRICE_LIST_LIMIT).await
    }
}

fn parse_price(
    raw: Option<&str>,
    field: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<Decimal> {
    let Some(raw) = raw else {
        errors.add(field, format!("The {} field is required.", label));
        return None;
    };

    let Ok(value) = raw.trim().parse::<Decimal>() else {
        errors.add(field, format!("The {} must be a number.", label));
        return None;
    };

    if value.is_sign_negative() {
        errors.add(field, format!("The {} must be at least 0.", label));
        return None;
    }

    Some(value)
}
