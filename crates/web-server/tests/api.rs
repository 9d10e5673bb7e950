//! End-to-end tests of the HTTP surface over the in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use database::{DocumentStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    web_server::app(store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_category(app: &Router, key: &str, name: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/categories",
        Some(json!({ "categoryId": key, "categoryName": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn product_body(key: &str, category: &Value) -> Value {
    json!({
        "productId": key,
        "productName": "Chai",
        "qtyPerUnit": 10,
        "unitPrice": 18,
        "unitInStock": 39,
        "discontinued": false,
        "categoryId": category,
    })
}

#[tokio::test]
async fn create_and_list_products_with_resolved_category() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    let category_id = beverages["internalId"].clone();

    let (status, product) = send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &category_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["productId"], json!("P1"));
    assert_eq!(product["qtyPerUnit"], json!(10));
    assert_eq!(product["categoryReference"], category_id);

    for uri in ["/products", "/productsWithCategories"] {
        let (status, products) = send_json(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let products = products.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["categoryReference"], beverages);
    }
}

#[tokio::test]
async fn product_with_unknown_category_is_rejected() {
    let app = test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &json!(Uuid::new_v4()))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid category ID" }));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &json!("not-an-id"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid category ID" }));

    let (_, products) = send_json(&app, Method::GET, "/products", None).await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn malformed_field_is_a_bad_request() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    let mut body = product_body("P1", &beverages["internalId"]);
    body["unitPrice"] = json!("eighteen");

    let (status, body) = send_json(&app, Method::POST, "/products", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid value for unitPrice: expected a number" }));
}

#[tokio::test]
async fn malformed_json_body_uses_error_envelope() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (_, products) = send_json(&app, Method::GET, "/products", None).await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn body_without_content_type_is_a_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/categories")
        .body(Body::from(r#"{"categoryId":"C1"}"#))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (_, categories) = send_json(&app, Method::GET, "/categories", None).await;
    assert_eq!(categories, json!([]));
}

#[tokio::test]
async fn duplicate_category_id_is_rejected() {
    let app = test_app();
    create_category(&app, "C1", "Beverages").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "categoryId": "C1", "categoryName": "Condiments" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Category ID already exists" }));

    let (_, categories) = send_json(&app, Method::GET, "/categories", None).await;
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn get_product_by_internal_id() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    let (_, product) = send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &beverages["internalId"])),
    )
    .await;
    let id = product["internalId"].as_str().unwrap();

    let (status, found) = send_json(&app, Method::GET, &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["categoryReference"], beverages);

    let (status, _) = send_json(&app, Method::GET, &format!("/products/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send_json(&app, Method::GET, "/products/P1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Product not found" }));
}

#[tokio::test]
async fn get_product_by_business_key() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &beverages["internalId"])),
    )
    .await;

    let (status, found) = send_json(&app, Method::GET, "/productsByKey/P1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["productId"], json!("P1"));
    assert_eq!(found["categoryReference"], beverages);

    let (status, _) = send_json(&app, Method::GET, "/productsByKey/P2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_product_overwrites_fields() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    let condiments = create_category(&app, "C2", "Condiments").await;
    let (_, product) = send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &beverages["internalId"])),
    )
    .await;
    let uri = format!("/products/{}", product["internalId"].as_str().unwrap());

    let (status, updated) = send_json(
        &app,
        Method::PUT,
        &uri,
        Some(json!({
            "productName": "Aniseed Syrup",
            "unitPrice": "10.5",
            "categoryId": condiments["internalId"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["productId"], json!("P1"));
    assert_eq!(updated["productName"], json!("Aniseed Syrup"));
    assert_eq!(updated["unitPrice"], json!(10.5));
    assert_eq!(updated["qtyPerUnit"], Value::Null);
    assert_eq!(updated["discontinued"], Value::Null);
    assert_eq!(updated["categoryReference"], condiments["internalId"]);

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "productName": "Chang", "categoryId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_product_is_not_found() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/products/{}", Uuid::new_v4()),
        Some(product_body("P1", &beverages["internalId"])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, products) = send_json(&app, Method::GET, "/products", None).await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn get_category_by_internal_id() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    let uri = format!("/categories/{}", beverages["internalId"].as_str().unwrap());

    let (status, found) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, beverages);

    let (status, body) = send_json(&app, Method::GET, "/categories/C1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Category not found" }));
}

#[tokio::test]
async fn delete_category_by_business_key() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;

    let (status, body) = send(&app, Method::DELETE, "/categories/C9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, deleted) = send_json(&app, Method::DELETE, "/categories/C1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, beverages);

    let (_, categories) = send_json(&app, Method::GET, "/categories", None).await;
    assert_eq!(categories, json!([]));
}

#[tokio::test]
async fn deleting_a_category_leaves_products_dangling() {
    let app = test_app();
    let beverages = create_category(&app, "C1", "Beverages").await;
    send_json(
        &app,
        Method::POST,
        "/products",
        Some(product_body("P1", &beverages["internalId"])),
    )
    .await;
    send(&app, Method::DELETE, "/categories/C1", None).await;

    let (status, products) = send_json(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products[0]["categoryReference"], Value::Null);
}

#[tokio::test]
async fn health_check() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
