use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use core_types::{Category, CategoryInput, Product, ProductInput};
use std::sync::Arc;
use uuid::Uuid;

/// Internal ids are UUIDs; anything else cannot name a stored document.
/// Such ids answer 404 rather than surfacing a cast failure as a 500.
fn parse_internal_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{entity} not found")))
}

/// # POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<ProductInput>, AppError>,
) -> Result<Json<Product>, AppError> {
    let draft = input.validate()?;
    let product = state.products.create(draft).await?;
    Ok(Json(product))
}

/// # GET /products
/// Also served at `/productsWithCategories`. Categories are always resolved.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list_all(true).await?;
    Ok(Json(products))
}

/// # GET /products/:productId
/// The path segment is the product's internal id.
pub async fn get_product(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Product>, AppError> {
    let id = parse_internal_id(&id, "Product")?;
    let product = state.products.get_by_internal_id(id, true).await?;
    Ok(Json(product))
}

/// # GET /productsByKey/:productId
pub async fn get_product_by_key(
    Path(product_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Product>, AppError> {
    let product = state.products.get_by_business_key(&product_id).await?;
    Ok(Json(product))
}

/// # PUT /products/:productId
pub async fn update_product(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<ProductInput>, AppError>,
) -> Result<Json<Product>, AppError> {
    let id = parse_internal_id(&id, "Product")?;
    let (fields, category) = input.validate_update()?;
    let product = state.products.update(id, fields, category).await?;
    Ok(Json(product))
}

/// # POST /categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<CategoryInput>, AppError>,
) -> Result<Json<Category>, AppError> {
    let draft = input.validate()?;
    let category = state.categories.create(draft).await?;
    Ok(Json(category))
}

/// # GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.categories.list_all().await?;
    Ok(Json(categories))
}

/// # GET /categories/:categoryId
/// Despite the parameter name, this is the category's internal id.
pub async fn get_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Category>, AppError> {
    let id = parse_internal_id(&id, "Category")?;
    let category = state.categories.get_by_internal_id(id).await?;
    Ok(Json(category))
}

/// # DELETE /categories/:categoryId
/// Deletes by business key. An unknown key still answers 200, with an empty body.
pub async fn delete_category(
    Path(category_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let deleted = state.categories.delete_by_business_key(&category_id).await?;
    Ok(match deleted {
        Some(category) => Json(category).into_response(),
        None => StatusCode::OK.into_response(),
    })
}
