use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional; every value has a default. `BOOKKEEPER__SECTION__KEY`
/// environment variables override file values (e.g. `BOOKKEEPER__DATABASE__PATH`).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as `load_config`, reading the given file instead.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("BOOKKEEPER")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.database.path, Path::new("bookkeeper.db"));
        assert_eq!(config.database.category_table, "categories_table");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[database]\npath = \"money.db\"\nbudget_table = \"limits\"\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.database.path, Path::new("money.db"));
        assert_eq!(config.database.budget_table, "limits");
        assert_eq!(config.database.expense_table, "expense_table");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn clashing_table_names_are_rejected() {
        let mut config = Config::default();
        config.database.budget_table = config.database.expense_table.clone();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
