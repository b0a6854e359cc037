//! Product domain model

use crate::domain::StringUuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: StringUuid,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated row ready for insertion
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
}

/// Column-level changes applied by the repository. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("min"));
    }
    Ok(())
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, message = "The name field is required."))]
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,

    #[validate(length(
        max = 1000,
        message = "The description may not be greater than 1000 characters."
    ))]
    pub description: Option<String>,

    #[validate(custom(
        function = "non_negative",
        message = "The unit price must be at least 0."
    ))]
    pub unit_price: Decimal,
}

/// Input for updating a product. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, message = "The name field is required."))]
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,

    #[validate(length(
        max = 1000,
        message = "The description may not be greater than 1000 characters."
    ))]
    pub description: Option<String>,

    #[validate(custom(
        function = "non_negative",
        message = "The unit price must be at least 0."
    ))]
    pub unit_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_product_input_valid() {
        let input = CreateProductInput {
            name: "Widget".to_string(),
            description: Some("A fine widget".to_string()),
            unit_price: dec!(19.99),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_product_input_negative_price() {
        let input = CreateProductInput {
            name: "Widget".to_string(),
            description: None,
            unit_price: dec!(-1.00),
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("unit_price"));
    }

    #[test]
    fn test_create_product_input_empty_name() {
        let input = CreateProductInput {
            name: "".to_string(),
            description: None,
            unit_price: dec!(5),
        };

        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("name"));
    }

    #[test]
    fn test_update_product_input_empty_is_valid() {
        let input = UpdateProductInput::default();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_product_serialization() {
        let product = Product {
            id: StringUuid::new_v4(),
            name: "Widget".to_string(),
            description: None,
            unit_price: dec!(19.99),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["unit_price"], "19.99");
    }
}
