use crate::error::DbError;
use crate::store::DocumentStore;
use async_trait::async_trait;
use core_types::{Category, CategoryRef, NewCategory, NewProduct, Product};
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-process document store, used for tests and local runs without a
/// database. Documents are kept in insertion order.
///
/// Category keys are checked under the write lock, so this store enforces
/// key uniqueness the same way the PostgreSQL unique index does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_category(&self, draft: &NewCategory) -> Result<Category, DbError> {
        let mut state = self.state.write().await;
        if let Some(key) = &draft.category_id {
            if state
                .categories
                .iter()
                .any(|c| c.category_id.as_ref() == Some(key))
            {
                return Err(DbError::DuplicateKey { key: key.clone() });
            }
        }
        let category = Category {
            internal_id: Uuid::new_v4(),
            category_id: draft.category_id.clone(),
            category_name: draft.category_name.clone(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        Ok(self.state.read().await.categories.clone())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DbError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.internal_id == id).cloned())
    }

    async fn find_categories(&self, ids: &[Uuid]) -> Result<Vec<Category>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| ids.contains(&c.internal_id))
            .cloned()
            .collect())
    }

    async fn find_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .find(|c| c.category_id.as_deref() == Some(key))
            .cloned())
    }

    async fn delete_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError> {
        let mut state = self.state.write().await;
        let position = state
            .categories
            .iter()
            .position(|c| c.category_id.as_deref() == Some(key));
        Ok(position.map(|index| state.categories.remove(index)))
    }

    async fn insert_product(&self, draft: &NewProduct, category: Uuid) -> Result<Product, DbError> {
        let fields = draft.fields.clone();
        let product = Product {
            internal_id: Uuid::new_v4(),
            product_id: draft.product_id.clone(),
            product_name: fields.product_name,
            qty_per_unit: fields.qty_per_unit,
            unit_price: fields.unit_price,
            unit_in_stock: fields.unit_in_stock,
            discontinued: fields.discontinued,
            category_reference: Some(CategoryRef::Id(category)),
        };
        self.state.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        Ok(self.state.read().await.products.clone())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, DbError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.internal_id == id).cloned())
    }

    async fn find_product_by_key(&self, key: &str) -> Result<Option<Product>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .find(|p| p.product_id.as_deref() == Some(key))
            .cloned())
    }

    async fn save_product(&self, product: &Product) -> Result<Product, DbError> {
        let mut state = self.state.write().await;
        let stored = state
            .products
            .iter_mut()
            .find(|p| p.internal_id == product.internal_id)
            .ok_or(DbError::NotFound("Product"))?;

        // Stored documents only ever hold the bare reference.
        let mut saved = product.clone();
        saved.category_reference = product.category_id().map(CategoryRef::Id);
        *stored = saved.clone();
        Ok(saved)
    }
}
