use crate::error::DbError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, SqliteConnection};
use std::path::Path;

/// The file extension every database file must carry.
pub const DB_EXTENSION: &str = "db";

/// Builds the connection options for a single-file database.
///
/// The path must end in `.db`; anything else is rejected as a configuration
/// error before the file is touched. The file is created on first use.
pub fn connect_options(path: &Path) -> Result<SqliteConnectOptions, DbError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(DB_EXTENSION) => {}
        _ => {
            return Err(DbError::Configuration(format!(
                "database should be a .{} file, got '{}'",
                DB_EXTENSION,
                path.display()
            )));
        }
    }

    Ok(SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true))
}

/// Opens a fresh connection for a single operation.
///
/// There is no pool: callers open, run their statement and close.
pub async fn open(options: &SqliteConnectOptions) -> Result<SqliteConnection, DbError> {
    let conn = options.connect().await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_db_files_only() {
        assert!(connect_options(Path::new("data/bookkeeper.db")).is_ok());
        assert!(matches!(
            connect_options(Path::new("bookkeeper.sqlite")),
            Err(DbError::Configuration(_))
        ));
        assert!(matches!(
            connect_options(Path::new("test")),
            Err(DbError::Configuration(_))
        ));
    }
}
