use crate::connection::{connect_options, open};
use crate::error::{DbError, ValidationError};
use crate::repository::Repository;
use crate::schema::{
    Column, Record, Value, bind_value, decode_row, is_identifier, is_qualified_identifier,
    validate_columns,
};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Row};
use std::fmt;
use std::path::{Path, PathBuf};

/// A repository backed by one table of a single-file SQLite database.
///
/// Every call opens its own connection, runs in autocommit mode and closes the
/// connection again. Primary keys come from a counter held in this struct, so
/// two instances pointed at the same table will hand out clashing keys.
pub struct TableRepository<T: Record> {
    path: PathBuf,
    table_name: String,
    options: SqliteConnectOptions,
    columns: &'static [Column<T>],
    next_pk: i64,
}

impl<T: Record> TableRepository<T> {
    /// Opens (and if needed creates) `table_name` inside the database at `path`.
    ///
    /// The next primary key starts one past the largest key already stored,
    /// or at 1 for an empty table.
    pub async fn new(path: impl AsRef<Path>, table_name: &str) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        if !is_identifier(table_name) {
            return Err(DbError::Configuration(format!("'{}' is not a valid table name", table_name)));
        }
        validate_columns::<T>()?;
        let options = connect_options(&path)?;
        let columns = T::columns();

        let definitions = columns
            .iter()
            .map(|column| format!("{} {}", column.name, column.kind.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        let create_table = format!("CREATE TABLE IF NOT EXISTS {} ( {} )", table_name, definitions);
        let max_pk = format!("SELECT MAX({}) FROM {}", columns[0].name, table_name);

        let mut conn = open(&options).await?;
        sqlx::query(&create_table).execute(&mut conn).await?;
        let last_pk: Option<i64> = sqlx::query(&max_pk).fetch_one(&mut conn).await?.try_get(0)?;
        conn.close().await?;

        let next_pk = last_pk.map_or(1, |pk| pk + 1);
        tracing::info!(table = table_name, path = %path.display(), next_pk, "Table repository ready.");

        Ok(Self {
            path,
            table_name: table_name.to_string(),
            options,
            columns,
            next_pk,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    /// The key the next `add` will assign.
    pub fn next_pk(&self) -> i64 {
        self.next_pk
    }

    /// Moves the key counter, e.g. back to 1 after `delete_all`.
    pub fn set_next_pk(&mut self, pk: i64) {
        tracing::info!(table = %self.table_name, from = self.next_pk, to = pk, "Primary key counter reset.");
        self.next_pk = pk;
    }

    /// Removes every row. The table itself and the key counter are left as they are.
    pub async fn delete_all(&self) -> Result<u64, DbError> {
        let statement = format!("DELETE FROM {}", self.table_name);
        let mut conn = open(&self.options).await?;
        let result = sqlx::query(&statement).execute(&mut conn).await?;
        conn.close().await?;

        tracing::info!(table = %self.table_name, rows = result.rows_affected(), "Deleted all rows.");
        Ok(result.rows_affected())
    }

    /// Projects `columns` from `table_1 JOIN table_2 ON table_1.field_1 = table_2.field_2`.
    ///
    /// Column names may be qualified (`table.column`) to resolve ambiguity.
    /// Rows are returned as raw values in the order of `columns`.
    pub async fn get_join(
        &self,
        table_1: &str,
        table_2: &str,
        columns: &[&str],
        field_1: &str,
        field_2: &str,
    ) -> Result<Vec<Vec<Value>>, DbError> {
        for name in [table_1, table_2, field_1, field_2] {
            if !is_identifier(name) {
                return Err(DbError::Configuration(format!("'{}' is not a valid identifier", name)));
            }
        }
        if columns.is_empty() {
            return Err(DbError::Configuration("a join needs at least one column".to_string()));
        }
        if let Some(bad) = columns.iter().find(|column| !is_qualified_identifier(column)) {
            return Err(DbError::Configuration(format!("'{}' is not a valid column name", bad)));
        }

        let statement = format!(
            "SELECT {} FROM {} JOIN {} ON {}.{} = {}.{}",
            columns.join(", "),
            table_1,
            table_2,
            table_1,
            field_1,
            table_2,
            field_2
        );
        tracing::debug!(%statement, "Running join.");

        let mut conn = open(&self.options).await?;
        let rows = sqlx::query(&statement).fetch_all(&mut conn).await?;
        conn.close().await?;

        let values = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn check_columns(&self, names: &[&str]) -> Result<(), DbError> {
        match names.iter().find(|name| !self.columns.iter().any(|column| column.name == **name)) {
            Some(unknown) => Err(DbError::Configuration(format!(
                "table '{}' has no column '{}'",
                self.table_name, unknown
            ))),
            None => Ok(()),
        }
    }

    fn pk_column(&self) -> &'static str {
        self.columns[0].name
    }

    fn rehydrate(names: &[&str], values: Vec<Value>) -> Result<T, DbError> {
        let record = T::from_values(names.iter().copied().zip(values))?;
        Ok(record)
    }
}

/// Checks a primary key read from a record before it is used in a statement.
fn checked_pk(value: Value) -> Result<i64, ValidationError> {
    match value {
        Value::Integer(pk) if pk < 0 => Err(ValidationError::Negative { field: "pk", value: pk.to_string() }),
        Value::Integer(pk) => Ok(pk),
        other => Err(ValidationError::NotInteger { field: "pk", found: other.to_string() }),
    }
}

impl<T: Record> Repository<T> for TableRepository<T> {
    async fn add(&mut self, obj: &mut T) -> Result<i64, DbError> {
        let pk = self.next_pk;
        obj.set_pk(pk)?;
        self.next_pk += 1;

        let names = self.column_names();
        let statement = format!(
            "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
            self.table_name,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );
        let values = obj.to_values();
        let mut query = sqlx::query(&statement);
        for value in &values {
            query = bind_value(query, value);
        }

        let mut conn = open(&self.options).await?;
        let result = query.execute(&mut conn).await?;
        conn.close().await?;

        if result.rows_affected() == 0 {
            tracing::warn!(table = %self.table_name, pk, "Insert ignored: a row with this key already exists.");
        } else {
            tracing::debug!(table = %self.table_name, pk, "Row added.");
        }
        Ok(pk)
    }

    async fn get_by_pk(&self, pk: i64) -> Result<Option<T>, DbError> {
        let names = self.column_names();
        let statement = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            names.join(", "),
            self.table_name,
            self.pk_column()
        );

        let mut conn = open(&self.options).await?;
        let row = sqlx::query(&statement).bind(pk).fetch_optional(&mut conn).await?;
        conn.close().await?;

        match row {
            Some(row) => Ok(Some(Self::rehydrate(&names, decode_row(&row)?)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, filter: &[(&str, Value)], columns: &[&str]) -> Result<Vec<T>, DbError> {
        let names = if columns.is_empty() {
            self.column_names()
        } else {
            self.check_columns(columns)?;
            columns.to_vec()
        };
        let filter_names: Vec<&str> = filter.iter().map(|(name, _)| *name).collect();
        self.check_columns(&filter_names)?;

        let mut statement = format!("SELECT {} FROM {}", names.join(", "), self.table_name);
        if !filter.is_empty() {
            let conditions = filter_names
                .iter()
                .map(|name| format!("{} = ?", name))
                .collect::<Vec<_>>()
                .join(" AND ");
            statement.push_str(" WHERE ");
            statement.push_str(&conditions);
        }
        statement.push_str(&format!(" ORDER BY {}", self.pk_column()));

        let mut query = sqlx::query(&statement);
        for (_, value) in filter {
            query = bind_value(query, value);
        }

        let mut conn = open(&self.options).await?;
        let rows = query.fetch_all(&mut conn).await?;
        conn.close().await?;

        rows.iter()
            .map(|row| Self::rehydrate(&names, decode_row(row)?))
            .collect()
    }

    async fn update_by_pk(&self, obj: &T) -> Result<u64, DbError> {
        let pk = checked_pk(obj.pk_value())?;

        let assignments = self
            .columns
            .iter()
            .map(|column| format!("{} = ?", column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table_name,
            assignments,
            self.pk_column()
        );
        let values = obj.to_values();
        let mut query = sqlx::query(&statement);
        for value in &values {
            query = bind_value(query, value);
        }
        query = query.bind(pk);

        let mut conn = open(&self.options).await?;
        let result = query.execute(&mut conn).await?;
        conn.close().await?;

        if result.rows_affected() == 0 {
            tracing::warn!(table = %self.table_name, pk, "Update matched no row.");
        }
        Ok(result.rows_affected())
    }

    async fn delete_by_pk(&self, pk: i64) -> Result<u64, DbError> {
        let pk = checked_pk(Value::Integer(pk))?;
        let statement = format!("DELETE FROM {} WHERE {} = ?", self.table_name, self.pk_column());

        let mut conn = open(&self.options).await?;
        let result = sqlx::query(&statement).bind(pk).execute(&mut conn).await?;
        conn.close().await?;

        tracing::debug!(table = %self.table_name, pk, rows = result.rows_affected(), "Delete by key.");
        Ok(result.rows_affected())
    }
}

impl<T: Record> fmt::Debug for TableRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRepository")
            .field("path", &self.path)
            .field("table_name", &self.table_name)
            .field("columns", &self.column_names())
            .field("next_pk", &self.next_pk)
            .finish()
    }
}
