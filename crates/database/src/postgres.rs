use crate::error::DbError;
use crate::store::DocumentStore;
use async_trait::async_trait;
use core_types::{Category, CategoryRef, NewCategory, NewProduct, Product};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "internal_id, category_key, category_name";
const PRODUCT_COLUMNS: &str = "internal_id, product_key, product_name, qty_per_unit, unit_price, unit_in_stock, discontinued, category_ref";

/// PostgreSQL-backed document store. Cheap to clone; all clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Represents a row from the `categories` table.
#[derive(FromRow, Debug, Clone)]
struct CategoryRow {
    internal_id: Uuid,
    category_key: Option<String>,
    category_name: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            internal_id: row.internal_id,
            category_id: row.category_key,
            category_name: row.category_name,
        }
    }
}

/// Represents a row from the `products` table.
#[derive(FromRow, Debug, Clone)]
struct ProductRow {
    internal_id: Uuid,
    product_key: Option<String>,
    product_name: Option<String>,
    qty_per_unit: Option<f64>,
    unit_price: Option<f64>,
    unit_in_stock: Option<f64>,
    discontinued: Option<bool>,
    category_ref: Option<Uuid>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            internal_id: row.internal_id,
            product_id: row.product_key,
            product_name: row.product_name,
            qty_per_unit: row.qty_per_unit,
            unit_price: row.unit_price,
            unit_in_stock: row.unit_in_stock,
            discontinued: row.discontinued,
            category_reference: row.category_ref.map(CategoryRef::Id),
        }
    }
}

impl PgStore {
    /// Creates a new `PgStore` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The unique index on `category_key` catches inserts that race past the
/// repository's duplicate pre-check.
fn insert_error(err: sqlx::Error, key: &Option<String>) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DbError::DuplicateKey {
                key: key.clone().unwrap_or_default(),
            };
        }
    }
    DbError::Query(err)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_category(&self, draft: &NewCategory) -> Result<Category, DbError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (internal_id, category_key, category_name) VALUES ($1, $2, $3) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.category_id)
        .bind(&draft.category_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &draft.category_id))?;
        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, DbError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE internal_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn find_categories(&self, ids: &[Uuid]) -> Result<Vec<Category>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE internal_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_key = $1 ORDER BY seq ASC LIMIT 1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn delete_category_by_key(&self, key: &str) -> Result<Option<Category>, DbError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            DELETE FROM categories
            WHERE internal_id = (
                SELECT internal_id FROM categories WHERE category_key = $1 ORDER BY seq ASC LIMIT 1
            )
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn insert_product(&self, draft: &NewProduct, category: Uuid) -> Result<Product, DbError> {
        let fields = &draft.fields;
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (internal_id, product_key, product_name, qty_per_unit, unit_price, unit_in_stock, discontinued, category_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.product_id)
        .bind(&fields.product_name)
        .bind(fields.qty_per_unit)
        .bind(fields.unit_price)
        .bind(fields.unit_in_stock)
        .bind(fields.discontinued)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, DbError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE internal_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    async fn find_product_by_key(&self, key: &str) -> Result<Option<Product>, DbError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_key = $1 ORDER BY seq ASC LIMIT 1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    async fn save_product(&self, product: &Product) -> Result<Product, DbError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET product_key = $2, product_name = $3, qty_per_unit = $4, unit_price = $5,
                unit_in_stock = $6, discontinued = $7, category_ref = $8
            WHERE internal_id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.internal_id)
        .bind(&product.product_id)
        .bind(&product.product_name)
        .bind(product.qty_per_unit)
        .bind(product.unit_price)
        .bind(product.unit_in_stock)
        .bind(product.discontinued)
        .bind(product.category_id())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Product::from).ok_or(DbError::NotFound("Product"))
    }
}
