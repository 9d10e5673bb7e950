use crate::error::DbError;
use crate::store::DocumentStore;
use core_types::{Category, NewCategory, NewProduct, Product, ProductFields};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over categories.
///
/// The duplicate-key check before insert is not atomic with the insert
/// itself; a store-level uniqueness constraint turns the losing side of a
/// race into `DuplicateKey` as well.
#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<dyn DocumentStore>,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Inserts a new category, rejecting a business key that is already taken.
    pub async fn create(&self, draft: NewCategory) -> Result<Category, DbError> {
        if let Some(key) = &draft.category_id {
            if self.store.find_category_by_key(key).await?.is_some() {
                return Err(DbError::DuplicateKey { key: key.clone() });
            }
        }
        let category = self.store.insert_category(&draft).await?;
        tracing::debug!(internal_id = %category.internal_id, "Category created.");
        Ok(category)
    }

    pub async fn list_all(&self) -> Result<Vec<Category>, DbError> {
        self.store.list_categories().await
    }

    pub async fn get_by_internal_id(&self, id: Uuid) -> Result<Category, DbError> {
        self.store
            .find_category(id)
            .await?
            .ok_or(DbError::NotFound("Category"))
    }

    /// Deletes the first category with this business key.
    ///
    /// Returns `None` when nothing matched. Products that referenced the
    /// deleted category keep their now dangling reference.
    pub async fn delete_by_business_key(&self, key: &str) -> Result<Option<Category>, DbError> {
        let deleted = self.store.delete_category_by_key(key).await?;
        if let Some(category) = &deleted {
            tracing::debug!(internal_id = %category.internal_id, "Category deleted.");
        }
        Ok(deleted)
    }
}

/// CRUD operations over products, including category resolution on read.
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Inserts a new product. The returned document carries the bare category id.
    pub async fn create(&self, draft: NewProduct) -> Result<Product, DbError> {
        let category = self.require_category(draft.category).await?;
        let product = self.store.insert_product(&draft, category).await?;
        tracing::debug!(internal_id = %product.internal_id, "Product created.");
        Ok(product)
    }

    pub async fn list_all(&self, resolve: bool) -> Result<Vec<Product>, DbError> {
        let products = self.store.list_products().await?;
        if resolve {
            self.resolve_categories(products).await
        } else {
            Ok(products)
        }
    }

    pub async fn get_by_internal_id(&self, id: Uuid, resolve: bool) -> Result<Product, DbError> {
        let product = self
            .store
            .find_product(id)
            .await?
            .ok_or(DbError::NotFound("Product"))?;
        if resolve {
            self.resolve_one(product).await
        } else {
            Ok(product)
        }
    }

    /// Looks a product up by its business key. The category is always resolved.
    pub async fn get_by_business_key(&self, key: &str) -> Result<Product, DbError> {
        let product = self
            .store
            .find_product_by_key(key)
            .await?
            .ok_or(DbError::NotFound("Product"))?;
        self.resolve_one(product).await
    }

    /// Overwrites every mutable field of an existing product.
    ///
    /// The product must exist before the category is checked, so an unknown
    /// product is reported as `NotFound` even when the category is also bad.
    pub async fn update(
        &self,
        id: Uuid,
        fields: ProductFields,
        category: Option<Uuid>,
    ) -> Result<Product, DbError> {
        let mut product = self
            .store
            .find_product(id)
            .await?
            .ok_or(DbError::NotFound("Product"))?;
        let category = self.require_category(category).await?;

        product.apply(fields, category);
        let saved = self.store.save_product(&product).await?;
        tracing::debug!(internal_id = %saved.internal_id, "Product updated.");
        Ok(saved)
    }

    async fn require_category(&self, id: Option<Uuid>) -> Result<Uuid, DbError> {
        let id = id.ok_or(DbError::InvalidReference)?;
        match self.store.find_category(id).await? {
            Some(category) => Ok(category.internal_id),
            None => Err(DbError::InvalidReference),
        }
    }

    async fn resolve_one(&self, product: Product) -> Result<Product, DbError> {
        let mut resolved = self.resolve_categories(vec![product]).await?;
        resolved.pop().ok_or(DbError::NotFound("Product"))
    }

    /// Swaps each bare reference for its category document, fetching every
    /// distinct category once.
    async fn resolve_categories(&self, products: Vec<Product>) -> Result<Vec<Product>, DbError> {
        let ids: Vec<Uuid> = products
            .iter()
            .filter_map(Product::category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let categories: HashMap<Uuid, Category> = self
            .store
            .find_categories(&ids)
            .await?
            .into_iter()
            .map(|c| (c.internal_id, c))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| product.resolve(&categories))
            .collect())
    }
}
