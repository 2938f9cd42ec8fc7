use crate::enums::BudgetPeriod;
use crate::error::CoreError;
use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name of the fallback category that expenses are moved to when their own
/// category disappears. It always exists once the category table is initialised.
pub const NOT_STATED_CATEGORY: &str = "Not stated";

/// A single recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Primary key in the expense table. Zero until the expense is persisted.
    pub pk: i64,
    /// When the record was entered.
    pub added_date: NaiveDateTime,
    /// When the money was actually spent.
    pub expense_date: NaiveDateTime,
    /// Primary key of the owning `Category`.
    pub category: i64,
    pub amount: Decimal,
    pub comment: String,
}

impl Expense {
    /// Creates an unsaved expense stamped with the current local time as its `added_date`.
    pub fn new(amount: Decimal, category: i64, expense_date: NaiveDateTime) -> Self {
        Self {
            pk: 0,
            added_date: Local::now().naive_local(),
            expense_date,
            category,
            amount,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl Default for Expense {
    fn default() -> Self {
        Self::new(Decimal::ZERO, 0, Local::now().naive_local())
    }
}

/// A node of the category forest. A `None` parent marks a top-level category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub pk: i64,
    pub name: String,
    pub parent: Option<i64>,
}

impl Category {
    pub fn new(name: impl Into<String>, parent: Option<i64>) -> Self {
        Self {
            pk: 0,
            name: name.into(),
            parent,
        }
    }
}

/// Looks up the primary key of the category called `name`.
pub fn category_pk_by_name(name: &str, categories: &[Category]) -> Result<i64, CoreError> {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| category.pk)
        .ok_or_else(|| CoreError::UnknownCategory(name.to_string()))
}

/// Returns the direct children of `parent`, in table order.
pub fn subcategories<'a>(parent: &Category, categories: &'a [Category]) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|category| category.parent == Some(parent.pk))
        .collect()
}

/// The planned spending for one period together with what has actually been spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub pk: i64,
    pub period: BudgetPeriod,
    /// The planned limit.
    pub budget: Decimal,
    /// The actual accumulated spending for the period.
    pub amount: Decimal,
}

impl Budget {
    /// Creates an unsaved budget with no spending recorded yet.
    pub fn new(period: BudgetPeriod, budget: Decimal) -> Self {
        Self {
            pk: 0,
            period,
            budget,
            amount: Decimal::ZERO,
        }
    }

    /// Projects the budget into the row shown in the budget overview.
    pub fn table_row(&self) -> BudgetLine {
        BudgetLine {
            period: self.period,
            budget: self.budget,
            spent: self.amount,
            remaining: self.budget - self.amount,
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(BudgetPeriod::Day, Decimal::ZERO)
    }
}

/// One line of the budget overview: limit, spending and what is left of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub period: BudgetPeriod,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn forest() -> Vec<Category> {
        vec![
            Category { pk: 1, name: NOT_STATED_CATEGORY.to_string(), parent: None },
            Category { pk: 2, name: "food".to_string(), parent: None },
            Category { pk: 3, name: "meat".to_string(), parent: Some(2) },
            Category { pk: 4, name: "fish".to_string(), parent: Some(2) },
            Category { pk: 5, name: "salmon".to_string(), parent: Some(4) },
        ]
    }

    #[test]
    fn finds_category_pk_by_name() {
        let categories = forest();
        assert_eq!(category_pk_by_name("fish", &categories), Ok(4));
        assert_eq!(
            category_pk_by_name("books", &categories),
            Err(CoreError::UnknownCategory("books".to_string()))
        );
    }

    #[test]
    fn lists_only_direct_children() {
        let categories = forest();
        let names: Vec<&str> = subcategories(&categories[1], &categories)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["meat", "fish"]);
        assert!(subcategories(&categories[4], &categories).is_empty());
    }

    #[test]
    fn budget_row_reports_remaining_amount() {
        let mut budget = Budget::new(BudgetPeriod::Week, dec!(1000));
        budget.amount = dec!(250.50);
        let line = budget.table_row();
        assert_eq!(line.spent, dec!(250.50));
        assert_eq!(line.remaining, dec!(749.50));
    }

    #[test]
    fn new_expense_is_unsaved() {
        let date = NaiveDateTime::parse_from_str("30-08-2020 08:15", crate::TIMESTAMP_FORMAT).unwrap();
        let expense = Expense::new(dec!(10), 1, date).with_comment("coffee");
        assert_eq!(expense.pk, 0);
        assert_eq!(expense.expense_date, date);
        assert_eq!(expense.comment, "coffee");
    }
}
