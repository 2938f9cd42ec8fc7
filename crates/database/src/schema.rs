//! Explicit mapping between record types and table columns.
//!
//! A record type declares its columns once, as `(name, type, getter, setter)`
//! descriptors. The repository validates the declaration when it is built and
//! afterwards moves data between rows and records only through these accessors.

use crate::error::{DbError, ValidationError};
use chrono::NaiveDateTime;
use core_types::TIMESTAMP_FORMAT;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};
use std::collections::HashSet;
use std::fmt;

/// A single SQLite cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Reads an integer. Integral text is accepted because some integer
    /// references are kept in TEXT columns.
    pub fn into_integer(self, field: &'static str) -> Result<i64, ValidationError> {
        match self {
            Value::Integer(v) => Ok(v),
            Value::Text(ref s) => s.trim().parse::<i64>().map_err(|_| ValidationError::NotInteger {
                field,
                found: self.to_string(),
            }),
            other => Err(ValidationError::NotInteger { field, found: other.to_string() }),
        }
    }

    /// Like `into_integer`, but NULL maps to `None`.
    pub fn into_optional_integer(self, field: &'static str) -> Result<Option<i64>, ValidationError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_integer(field).map(Some),
        }
    }

    /// Reads a number. Text is never coerced.
    pub fn into_real(self, field: &'static str) -> Result<f64, ValidationError> {
        match self {
            Value::Integer(v) => Ok(v as f64),
            Value::Real(v) if v.is_finite() => Ok(v),
            other => Err(ValidationError::NotNumeric { field, found: other.to_string() }),
        }
    }

    pub fn into_text(self, field: &'static str) -> Result<String, ValidationError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(ValidationError::NotText { field, found: other.to_string() }),
        }
    }

    /// Reads a timestamp in the storage format and returns it re-rendered in
    /// that format.
    pub fn into_timestamp(self, field: &'static str) -> Result<String, ValidationError> {
        let parsed = match &self {
            Value::Text(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok(),
            _ => None,
        };
        parsed
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .ok_or_else(|| ValidationError::BadTimestamp { field, found: self.to_string() })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    IntegerPrimaryKey,
    Integer,
    Real,
    Text,
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::IntegerPrimaryKey => "INTEGER PRIMARY KEY",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

/// Describes one column of a record type: its name, SQL type and how to read
/// and write the matching field.
pub struct Column<T> {
    pub name: &'static str,
    pub kind: ColumnType,
    pub get: fn(&T) -> Value,
    pub set: fn(&mut T, Value) -> Result<(), ValidationError>,
}

/// A type that can be stored as one row of a table.
///
/// The first column returned by `columns` is the primary key.
pub trait Record: Default + Send + Sync + Sized + 'static {
    fn columns() -> &'static [Column<Self>];

    fn pk_value(&self) -> Value {
        (Self::columns()[0].get)(self)
    }

    fn set_pk(&mut self, pk: i64) -> Result<(), ValidationError> {
        (Self::columns()[0].set)(self, Value::Integer(pk))
    }

    /// All field values in column order.
    fn to_values(&self) -> Vec<Value> {
        Self::columns().iter().map(|column| (column.get)(self)).collect()
    }

    /// Builds a record from named values. Columns that are not mentioned keep
    /// their default value; a name that is not a column is rejected.
    fn from_values<'a, I>(values: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut record = Self::default();
        for (name, value) in values {
            let column = Self::columns()
                .iter()
                .find(|column| column.name == name)
                .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
            (column.set)(&mut record, value)?;
        }
        Ok(record)
    }
}

/// Checks a record type's column declaration.
pub fn validate_columns<T: Record>() -> Result<(), DbError> {
    let columns = T::columns();
    let first = columns
        .first()
        .ok_or_else(|| DbError::Configuration("a record needs at least one column".to_string()))?;
    if first.kind != ColumnType::IntegerPrimaryKey {
        return Err(DbError::Configuration(format!(
            "first column '{}' must be the integer primary key",
            first.name
        )));
    }

    let mut seen = HashSet::new();
    for (index, column) in columns.iter().enumerate() {
        if !is_identifier(column.name) {
            return Err(DbError::Configuration(format!("'{}' is not a valid column name", column.name)));
        }
        if !seen.insert(column.name) {
            return Err(DbError::Configuration(format!("column '{}' is declared twice", column.name)));
        }
        if index > 0 && column.kind == ColumnType::IntegerPrimaryKey {
            return Err(DbError::Configuration(format!(
                "only the first column may be the primary key, found '{}'",
                column.name
            )));
        }
    }
    Ok(())
}

/// True for plain SQL identifiers: a letter or underscore followed by letters,
/// digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accepts `column` or `table.column`.
pub fn is_qualified_identifier(name: &str) -> bool {
    match name.split_once('.') {
        Some((table, column)) => is_identifier(table) && is_identifier(column),
        None => is_identifier(name),
    }
}

pub(crate) fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
    }
}

/// Reads every cell of a row using the storage class of the stored value.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Vec<Value>, sqlx::Error> {
    (0..row.len())
        .map(|index| {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                return Ok(Value::Null);
            }
            let value = match raw.type_info().name() {
                "INTEGER" => Value::Integer(row.try_get(index)?),
                "REAL" => Value::Real(row.try_get(index)?),
                "TEXT" => Value::Text(row.try_get(index)?),
                _ => {
                    let bytes: Vec<u8> = row.try_get(index)?;
                    Value::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
            };
            Ok(value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_reader_accepts_integral_text_only() {
        assert_eq!(Value::Text("3".into()).into_integer("category"), Ok(3));
        assert!(Value::Text("cat".into()).into_integer("category").is_err());
        assert!(Value::Real(10.9).into_integer("category").is_err());
        assert!(Value::Null.into_integer("category").is_err());
    }

    #[test]
    fn real_reader_never_coerces_text() {
        assert_eq!(Value::Integer(10).into_real("amount"), Ok(10.0));
        assert!(Value::Text("100".into()).into_real("amount").is_err());
        assert!(Value::Real(f64::NAN).into_real("amount").is_err());
    }

    #[test]
    fn timestamp_reader_checks_format() {
        assert_eq!(
            Value::Text(" 30-08-2020 08:15".into()).into_timestamp("expense_date"),
            Ok("30-08-2020 08:15".to_string())
        );
        assert!(Value::Text("2020-08-30 08:15".into()).into_timestamp("expense_date").is_err());
        assert!(Value::Text("date".into()).into_timestamp("expense_date").is_err());
        assert!(Value::Integer(10).into_timestamp("expense_date").is_err());
        assert!(Value::Null.into_timestamp("expense_date").is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("expense_table"));
        assert!(is_identifier("_pk2"));
        assert!(!is_identifier("2pk"));
        assert!(!is_identifier("pk; DROP TABLE x"));
        assert!(is_qualified_identifier("expense_table.pk"));
        assert!(!is_qualified_identifier("a.b.c"));
    }
}
