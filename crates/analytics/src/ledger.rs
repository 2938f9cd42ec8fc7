use crate::error::AnalyticsError;
use core_types::{Category, Expense, NOT_STATED_CATEGORY};
use database::{ExpenseRow, Repository, Value};

/// Reads every stored expense back into its domain form.
pub async fn load_expenses<R>(expenses: &R) -> Result<Vec<Expense>, AnalyticsError>
where
    R: Repository<ExpenseRow>,
{
    let rows = expenses.get_all(&[], &[]).await?;
    let mut loaded = Vec::with_capacity(rows.len());
    for row in &rows {
        loaded.push(row.to_expense()?);
    }
    Ok(loaded)
}

/// Points every expense of category `from` at category `to`.
///
/// Returns the number of expenses that were moved.
pub async fn reassign_category<R>(expenses: &R, from: i64, to: i64) -> Result<usize, AnalyticsError>
where
    R: Repository<ExpenseRow>,
{
    let rows = expenses.get_all(&[("category", Value::Integer(from))], &[]).await?;
    let mut moved = 0;
    for mut row in rows {
        row.category = to;
        moved += expenses.update_by_pk(&row).await? as usize;
    }
    tracing::info!(from, to, moved, "Reassigned expenses to another category.");
    Ok(moved)
}

/// Returns all categories, first creating the "Not stated" fallback when the
/// table is empty.
pub async fn ensure_categories<R>(categories: &mut R) -> Result<Vec<Category>, AnalyticsError>
where
    R: Repository<Category>,
{
    let existing = categories.get_all(&[], &[]).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }
    let mut fallback = Category::new(NOT_STATED_CATEGORY, None);
    categories.add(&mut fallback).await?;
    Ok(vec![fallback])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use database::TableRepository;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("05-05-2025 10:00", core_types::TIMESTAMP_FORMAT).unwrap()
    }

    #[tokio::test]
    async fn moves_expenses_between_categories() {
        let dir = tempfile::tempdir().unwrap();
        let mut expenses = TableRepository::<ExpenseRow>::new(dir.path().join("ledger.db"), "expense_table")
            .await
            .unwrap();
        for (category, amount) in [(1, dec!(5)), (2, dec!(6)), (1, dec!(7))] {
            let mut row = ExpenseRow::new(&Expense::new(amount, category, date())).unwrap();
            expenses.add(&mut row).await.unwrap();
        }

        assert_eq!(reassign_category(&expenses, 1, 9).await.unwrap(), 2);
        let loaded = load_expenses(&expenses).await.unwrap();
        let categories: Vec<i64> = loaded.iter().map(|e| e.category).collect();
        assert_eq!(categories, vec![9, 2, 9]);
        assert_eq!(loaded[2].amount, dec!(7));
    }

    #[tokio::test]
    async fn fallback_category_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut categories = TableRepository::<Category>::new(dir.path().join("ledger.db"), "categories_table")
            .await
            .unwrap();

        let first = ensure_categories(&mut categories).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, NOT_STATED_CATEGORY);
        assert_eq!(first[0].pk, 1);

        let second = ensure_categories(&mut categories).await.unwrap();
        assert_eq!(second, first);
    }
}
