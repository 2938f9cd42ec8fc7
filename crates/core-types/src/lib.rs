pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::BudgetPeriod;
pub use error::CoreError;
pub use structs::{
    Budget, BudgetLine, Category, Expense, NOT_STATED_CATEGORY, category_pk_by_name,
    subcategories,
};

/// The single textual timestamp layout used wherever a date-time is stored or typed in.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";
