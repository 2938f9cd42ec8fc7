use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid repository configuration: {0}")]
    Configuration(String),

    #[error("Failed to execute a statement against the database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid field value: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejections raised while turning field values into a storable row, or while
/// checking a primary key argument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Only an integer {field} is allowed, got {found}")]
    NotInteger { field: &'static str, found: String },

    #[error("Only a numeric {field} is allowed, got {found}")]
    NotNumeric { field: &'static str, found: String },

    #[error("Only a text {field} is allowed, got {found}")]
    NotText { field: &'static str, found: String },

    #[error("Only a non-negative {field} is allowed, got {value}")]
    Negative { field: &'static str, value: String },

    #[error("Unsupported {field} value {found}")]
    Unsupported { field: &'static str, found: String },

    #[error("Expected {expected} field values, got {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("{field} must be a date-time in the form dd-mm-YYYY HH:MM, got {found}")]
    BadTimestamp { field: &'static str, found: String },
}
