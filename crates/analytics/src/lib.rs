//! # Bookkeeper Analytics
//!
//! Turns stored expenses into the numbers the user looks at: how much was
//! spent today, this week and this month, and how that compares with the
//! budget for each period.
//!
//! ## Public API
//!
//! - `SpendingSummary`: Day / ISO-week / month totals around a reference date.
//! - `sync_budgets` / `reset_budgets` / `budget_lines`: Maintenance of the three budget rows.
//! - `load_expenses` / `reassign_category` / `ensure_categories`: Ledger upkeep
//!   shared by every front end.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod budgets;
pub mod error;
pub mod ledger;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use budgets::{budget_lines, reset_budgets, sync_budgets};
pub use error::AnalyticsError;
pub use ledger::{ensure_categories, load_expenses, reassign_category};
pub use summary::SpendingSummary;
