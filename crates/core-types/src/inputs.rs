//! Request bodies and the validation pass that turns them into typed drafts.
//!
//! Every field is captured as a raw JSON value so that absent fields, `null`,
//! and loosely typed values (`"12"` for a number, `"true"` for a boolean) are
//! all handled here rather than by the deserializer.

use crate::error::CoreError;
use crate::structs::{NewCategory, NewProduct, ProductFields};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Body of `POST /categories`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub category_id: Value,
    #[serde(default)]
    pub category_name: Value,
}

impl CategoryInput {
    pub fn validate(self) -> Result<NewCategory, CoreError> {
        Ok(NewCategory {
            category_id: coerce_string("categoryId", self.category_id)?,
            category_name: coerce_string("categoryName", self.category_name)?,
        })
    }
}

/// Body of `POST /products` and `PUT /products/:id`.
///
/// `category_id` carries the category's internal id, not its business key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub product_id: Value,
    #[serde(default)]
    pub product_name: Value,
    #[serde(default)]
    pub qty_per_unit: Value,
    #[serde(default)]
    pub unit_price: Value,
    #[serde(default)]
    pub unit_in_stock: Value,
    #[serde(default)]
    pub discontinued: Value,
    #[serde(default)]
    pub category_id: Value,
}

impl ProductInput {
    /// Validates a create request.
    pub fn validate(self) -> Result<NewProduct, CoreError> {
        let product_id = coerce_string("productId", self.product_id.clone())?;
        let (fields, category) = self.validate_update()?;
        Ok(NewProduct {
            product_id,
            fields,
            category,
        })
    }

    /// Validates an update request. `productId` is not updatable and is ignored.
    pub fn validate_update(self) -> Result<(ProductFields, Option<Uuid>), CoreError> {
        let fields = ProductFields {
            product_name: coerce_string("productName", self.product_name)?,
            qty_per_unit: coerce_number("qtyPerUnit", self.qty_per_unit)?,
            unit_price: coerce_number("unitPrice", self.unit_price)?,
            unit_in_stock: coerce_number("unitInStock", self.unit_in_stock)?,
            discontinued: coerce_bool("discontinued", self.discontinued)?,
        };
        Ok((fields, parse_reference(&self.category_id)))
    }
}

/// A reference that is not a well-formed id can never match a category,
/// so it is reported as missing rather than as malformed.
fn parse_reference(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
}

fn coerce_string(field: &'static str, value: Value) -> Result<Option<String>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(CoreError::invalid(field, "expected a string")),
    }
}

fn coerce_number(field: &'static str, value: Value) -> Result<Option<f64>, CoreError> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(CoreError::invalid(field, "expected a number")),
    }
}

fn coerce_bool(field: &'static str, value: Value) -> Result<Option<bool>, CoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(Some(true)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(false)),
        Value::String(s) => match s.trim() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(CoreError::invalid(field, "expected a boolean")),
        },
        _ => Err(CoreError::invalid(field, "expected a boolean")),
    }
}
