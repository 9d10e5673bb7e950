use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatabaseSettings, LogSettings, ServerSettings};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of the environment overrides, e.g. `CATALOG__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "CATALOG";

/// Loads the application configuration.
///
/// Sources, from lowest to highest precedence: built-in defaults,
/// `DATABASE_URL` (also read from `.env`), the TOML file, and `CATALOG__*`
/// environment variables. An explicit `path` must exist; the default
/// `config.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut builder = config::Config::builder();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_default("database.url", url)?;
    }

    let settings = builder
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(settings)
}

/// Parses configuration from an in-memory TOML document, without consulting
/// the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;
    finish(settings)
}

fn finish(settings: config::Config) -> Result<Config, ConfigError> {
    let config = settings.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must be non-zero".to_string(),
        ));
    }
    if config.database.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.url must be set".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    Ok(())
}
