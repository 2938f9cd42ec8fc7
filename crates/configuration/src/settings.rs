use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Where the data lives and which tables hold it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path of the single-file database. Must end in `.db`.
    pub path: PathBuf,
    pub expense_table: String,
    pub category_table: String,
    pub budget_table: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bookkeeper.db"),
            expense_table: "expense_table".to_string(),
            category_table: "categories_table".to_string(),
            budget_table: "budget_table".to_string(),
        }
    }
}

/// Controls the tracing output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `database=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs also go to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks the values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        let tables = [&db.expense_table, &db.category_table, &db.budget_table];
        if tables.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::ValidationError("table names must not be empty".to_string()));
        }
        if db.expense_table == db.category_table
            || db.expense_table == db.budget_table
            || db.category_table == db.budget_table
        {
            return Err(ConfigError::ValidationError(
                "expense, category and budget tables must be distinct".to_string(),
            ));
        }
        if db.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("database path must not be empty".to_string()));
        }
        Ok(())
    }
}
