use crate::error::DbError;
use async_trait::async_trait;
use core_types::{Category, NewCategory, NewProduct, Product};
use uuid::Uuid;

/// The document store behind the repositories.
///
/// Implementations only persist and fetch; existence and duplicate checks
/// live in the repositories. Listing returns documents in insertion order.
/// Products come back with a bare `CategoryRef::Id` reference.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a category under a freshly assigned id. Fails with
    /// `DuplicateKey` if the store itself enforces key uniqueness.
    async fn insert_category(&self, draft: &NewCategory) -> Result<Category, DbError>;

    async fn list_categories(&self) -> Result<Vec<Category>, DbError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DbError>;

    /// Fetches every category whose id is in `ids`. Unknown ids are skipped.
    async fn find_categories(&self, ids: &[Uuid]) -> Result<Vec<Category>, DbError>;

    /// First category (in insertion order) with the given business key.
    async fn find_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError>;

    /// Deletes the first category with the given business key and returns it.
    async fn delete_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError>;

    async fn insert_product(&self, draft: &NewProduct, category: Uuid) -> Result<Product, DbError>;

    async fn list_products(&self) -> Result<Vec<Product>, DbError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, DbError>;

    /// First product (in insertion order) with the given business key.
    async fn find_product_by_key(&self, key: &str) -> Result<Option<Product>, DbError>;

    /// Rewrites every stored field of an existing product.
    async fn save_product(&self, product: &Product) -> Result<Product, DbError>;
}
