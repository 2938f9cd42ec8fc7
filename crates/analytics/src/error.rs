use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),

    #[error("Stored expense could not be read: {0}")]
    InvalidExpense(#[from] database::ValidationError),
}
