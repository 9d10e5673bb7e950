use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load settings for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A lookup by id or business key matched nothing. Holds the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A product pointed at a category that does not exist.
    #[error("Invalid category ID")]
    InvalidReference,

    #[error("Category ID already exists")]
    DuplicateKey { key: String },
}
