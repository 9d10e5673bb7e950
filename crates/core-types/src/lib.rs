pub mod error;
pub mod inputs;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use inputs::{CategoryInput, ProductInput};
pub use structs::{Category, CategoryRef, NewCategory, NewProduct, Product, ProductFields};
