use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

/// A product category, keyed internally by `internal_id` and by the
/// user-supplied business key `category_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub internal_id: Uuid,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

/// The category a product points at.
///
/// Stored as a bare `Id`. On read, when resolution is requested, the id is
/// swapped for the full document. A reference whose target has since been
/// deleted resolves to no category at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Resolved(Category),
    Id(Uuid),
}

impl CategoryRef {
    pub fn id(&self) -> Uuid {
        match self {
            CategoryRef::Resolved(category) => category.internal_id,
            CategoryRef::Id(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub internal_id: Uuid,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    #[serde(serialize_with = "serialize_number")]
    pub qty_per_unit: Option<f64>,
    #[serde(serialize_with = "serialize_number")]
    pub unit_price: Option<f64>,
    #[serde(serialize_with = "serialize_number")]
    pub unit_in_stock: Option<f64>,
    pub discontinued: Option<bool>,
    pub category_reference: Option<CategoryRef>,
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Writes integral values as JSON integers, so `10` comes back as `10`
/// rather than `10.0`.
fn serialize_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
            serializer.serialize_some(&(*n as i64))
        }
        Some(n) => serializer.serialize_some(n),
        None => serializer.serialize_none(),
    }
}

impl Product {
    /// The referenced category id, whether or not it has been resolved.
    pub fn category_id(&self) -> Option<Uuid> {
        self.category_reference.as_ref().map(CategoryRef::id)
    }

    /// Overwrites every mutable field. `product_id` is left untouched.
    pub fn apply(&mut self, fields: ProductFields, category: Uuid) {
        self.product_name = fields.product_name;
        self.qty_per_unit = fields.qty_per_unit;
        self.unit_price = fields.unit_price;
        self.unit_in_stock = fields.unit_in_stock;
        self.discontinued = fields.discontinued;
        self.category_reference = Some(CategoryRef::Id(category));
    }

    /// Replaces the bare reference with the matching document from `categories`.
    pub fn resolve(mut self, categories: &HashMap<Uuid, Category>) -> Self {
        self.category_reference = self
            .category_id()
            .and_then(|id| categories.get(&id).cloned())
            .map(CategoryRef::Resolved);
        self
    }
}

/// A validated category ready to be inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCategory {
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

/// The mutable, non-reference fields of a product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFields {
    pub product_name: Option<String>,
    pub qty_per_unit: Option<f64>,
    pub unit_price: Option<f64>,
    pub unit_in_stock: Option<f64>,
    pub discontinued: Option<bool>,
}

/// A validated product ready to be inserted.
///
/// `category` is `None` when the request carried no usable category id; the
/// repository rejects that as an invalid reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewProduct {
    pub product_id: Option<String>,
    pub fields: ProductFields,
    pub category: Option<Uuid>,
}
