//! # Catalog Database Crate
//!
//! This crate is the persistence layer for categories and products. It hides
//! the underlying store behind the `DocumentStore` trait and layers the
//! business rules (duplicate keys, category references, resolution) on top
//! in the repositories.
//!
//! ## Architectural Principles
//!
//! - **Injected handle:** the store is created once at startup and passed to
//!   the repositories as an `Arc<dyn DocumentStore>`; there is no global
//!   connection.
//! - **Two backends:** `PgStore` persists to PostgreSQL through a `PgPool`;
//!   `MemoryStore` keeps documents in process for tests and local runs.
//! - **No referential integrity in the store:** category references are only
//!   checked when a product is written.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: establish the pool and create the tables.
//! - `CategoryRepository` / `ProductRepository`: the operations the HTTP layer calls.
//! - `DbError`: the error taxonomy shared by every operation.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{CategoryRepository, ProductRepository};
pub use store::DocumentStore;
