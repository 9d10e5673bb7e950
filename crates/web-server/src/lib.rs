use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use configuration::Config;
use database::{CategoryRepository, DocumentStore, PgStore, ProductRepository};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub categories: CategoryRepository,
    pub products: ProductRepository,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            categories: CategoryRepository::new(store.clone()),
            products: ProductRepository::new(store),
        }
    }
}

/// Builds the application router over the given store.
pub fn app(store: Arc<dyn DocumentStore>) -> Router {
    let app_state = Arc::new(AppState::new(store));
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:productId",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route("/productsByKey/:productId", get(handlers::get_product_by_key))
        .route("/productsWithCategories", get(handlers::list_products))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:categoryId",
            get(handlers::get_category).delete(handlers::delete_category),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Serves the router on an already bound listener until the process exits.
pub async fn serve(listener: TcpListener, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(store)).await?;
    Ok(())
}

/// Connects to PostgreSQL, applies migrations if configured, and runs the server.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database).await?;
    if config.database.run_migrations {
        database::run_migrations(&db_pool).await?;
    }
    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(db_pool));

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    serve(listener, store).await
}
