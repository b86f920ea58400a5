//! Catalog product types and input validation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Raw create payload; everything optional so missing fields produce the
/// field-level messages instead of a serde rejection.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
}

/// Validated product ready for insertion.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub stock: i32,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::validation(format!("Field '{field}' is required"))),
    }
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, ApiError> {
        let name = required_text(self.name, "name")?;
        let price = self
            .price
            .ok_or_else(|| ApiError::validation("Field 'price' is required"))?;
        let category = required_text(self.category, "category")?;

        if price <= Decimal::ZERO {
            return Err(ApiError::validation("Price must be greater than 0"));
        }
        let stock = self.stock.unwrap_or(0);
        if stock < 0 {
            return Err(ApiError::validation("Stock cannot be negative"));
        }

        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default(),
            price,
            category,
            image: self.image.unwrap_or_default(),
            stock,
        })
    }
}

/// Partial update over the closed catalog field set. Unknown keys fail
/// deserialization instead of being silently dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.stock.is_none()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::validation("No valid fields to update"));
        }
        if matches!(self.price, Some(p) if p <= Decimal::ZERO) {
            return Err(ApiError::validation("Price must be greater than 0"));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(ApiError::validation("Stock cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateProductRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_requires_fields() {
        let err = request(r#"{"price": 2.5, "category": "fruits"}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Field 'name' is required");

        let err = request(r#"{"name": "  ", "price": 2.5, "category": "fruits"}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Field 'name' is required");

        let err = request(r#"{"name": "Milk", "category": "groceries"}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Field 'price' is required");
    }

    #[test]
    fn test_create_value_checks() {
        let err = request(r#"{"name": "Milk", "price": 0, "category": "groceries"}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Price must be greater than 0");

        let err = request(r#"{"name": "Milk", "price": 3.99, "category": "groceries", "stock": -1}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Stock cannot be negative");
    }

    #[test]
    fn test_create_defaults() {
        let p = request(r#"{"name": "Milk", "price": 3.99, "category": "groceries"}"#)
            .validate()
            .unwrap();
        assert_eq!(p.description, "");
        assert_eq!(p.image, "");
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let result: Result<ProductPatch, _> = serde_json::from_str(r#"{"prize": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_validation() {
        let patch: ProductPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(
            patch.validate().unwrap_err().to_string(),
            "No valid fields to update"
        );

        let patch: ProductPatch = serde_json::from_str(r#"{"price": -2}"#).unwrap();
        assert_eq!(
            patch.validate().unwrap_err().to_string(),
            "Price must be greater than 0"
        );

        let patch: ProductPatch = serde_json::from_str(r#"{"stock": 12}"#).unwrap();
        assert!(patch.validate().is_ok());
    }
}
