//! # Bookkeeper Database Crate
//!
//! This crate is the persistence core of the bookkeeper: it maps typed records
//! onto tables of a single-file SQLite database.
//!
//! ## Architectural Principles
//!
//! - **Explicit Mapping:** Every stored type implements `Record`, declaring its
//!   columns as `(name, type, getter, setter)` descriptors. Nothing is inferred
//!   from field names at run time.
//! - **One Table, One Repository:** A `TableRepository<T>` owns one table and the
//!   counter that hands out its primary keys.
//! - **Short-Lived Connections:** Each operation opens a connection, runs in
//!   autocommit mode and closes it. There is no pool and no long transaction.
//!
//! ## Public API
//!
//! - `Repository`: The five-operation contract every backend implements.
//! - `TableRepository`: The SQLite backend, plus joins, `delete_all` and the
//!   spending-by-category readers.
//! - `ExpenseRow`: The validating adapter from `Expense` to its stored shape.
//! - `DbError` / `ValidationError`: The error types returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod records;
pub mod reports;
pub mod repository;
pub mod row;
pub mod schema;
pub mod sqlite;

// Re-export the key components to create a clean, public-facing API.
pub use error::{DbError, ValidationError};
pub use reports::CategoryTotal;
pub use repository::Repository;
pub use row::ExpenseRow;
pub use schema::{Column, ColumnType, Record, Value};
pub use sqlite::TableRepository;
