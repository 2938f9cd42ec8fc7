use crate::error::DbError;
use crate::row::ExpenseRow;
use crate::schema::Value;
use crate::sqlite::TableRepository;
use chrono::{Local, NaiveDate, NaiveDateTime};
use core_types::{BudgetPeriod, TIMESTAMP_FORMAT};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;

/// One line of the "spending by category" report.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

impl TableRepository<ExpenseRow> {
    /// Sums expenses per category name over the period that contains `reference`.
    ///
    /// Stored `expense_date` strings are parsed and compared as dates. Lines are
    /// ordered by category name; categories without spending are left out.
    pub async fn expense_totals_by_category(
        &self,
        categories_table: &str,
        period: BudgetPeriod,
        reference: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, DbError> {
        let name = format!("{}.name", categories_table);
        let amount = format!("{}.amount", self.table_name());
        let expense_date = format!("{}.expense_date", self.table_name());
        let rows = self
            .get_join(
                self.table_name(),
                categories_table,
                &[name.as_str(), amount.as_str(), expense_date.as_str()],
                "category",
                "pk",
            )
            .await?;

        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in rows {
            let mut cells = row.into_iter();
            let (Some(Value::Text(category)), Some(amount), Some(Value::Text(date))) =
                (cells.next(), cells.next(), cells.next())
            else {
                tracing::warn!("Skipping a malformed expense row in the category report.");
                continue;
            };
            let Ok(date) = NaiveDateTime::parse_from_str(&date, TIMESTAMP_FORMAT) else {
                tracing::warn!(%date, "Skipping an expense with an unreadable date.");
                continue;
            };
            if !period.contains(reference, date.date()) {
                continue;
            }
            let amount = match amount {
                Value::Integer(v) => Decimal::from(v),
                Value::Real(v) => Decimal::from_f64(v).unwrap_or_default(),
                _ => Decimal::ZERO,
            };
            *totals.entry(category).or_default() += amount;
        }

        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }

    /// Spending per category for today.
    pub async fn get_cat_expense_data_day(&self, categories_table: &str) -> Result<Vec<CategoryTotal>, DbError> {
        self.expense_totals_by_category(categories_table, BudgetPeriod::Day, today())
            .await
    }

    /// Spending per category for the current ISO week.
    pub async fn get_cat_expense_data_week(&self, categories_table: &str) -> Result<Vec<CategoryTotal>, DbError> {
        self.expense_totals_by_category(categories_table, BudgetPeriod::Week, today())
            .await
    }

    /// Spending per category for the current month.
    pub async fn get_cat_expense_data_month(&self, categories_table: &str) -> Result<Vec<CategoryTotal>, DbError> {
        self.expense_totals_by_category(categories_table, BudgetPeriod::Month, today())
            .await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
