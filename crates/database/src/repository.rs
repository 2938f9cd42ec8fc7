use crate::error::DbError;
use crate::schema::Value;
use std::future::Future;

/// The capability set every storage backend provides for records of type `T`.
///
/// Missing rows are never errors: reads return `None`, and updates and
/// deletes report how many rows they touched, which is zero when the key does
/// not exist.
pub trait Repository<T> {
    /// Assigns a fresh primary key to `obj`, stores it and returns the key.
    fn add(&mut self, obj: &mut T) -> impl Future<Output = Result<i64, DbError>> + Send;

    /// Fetches the record with exactly this primary key.
    fn get_by_pk(&self, pk: i64) -> impl Future<Output = Result<Option<T>, DbError>> + Send;

    /// Fetches every record matching all `column = value` pairs of `filter`.
    ///
    /// An empty `filter` matches everything. A non-empty `columns` restricts
    /// which fields are loaded; the others keep their default values.
    fn get_all(
        &self,
        filter: &[(&str, Value)],
        columns: &[&str],
    ) -> impl Future<Output = Result<Vec<T>, DbError>> + Send;

    /// Overwrites the stored record that has `obj`'s primary key.
    fn update_by_pk(&self, obj: &T) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Removes the record with this primary key.
    fn delete_by_pk(&self, pk: i64) -> impl Future<Output = Result<u64, DbError>> + Send;
}
