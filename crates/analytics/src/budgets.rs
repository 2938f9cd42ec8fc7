use crate::error::AnalyticsError;
use crate::summary::SpendingSummary;
use core_types::{Budget, BudgetLine, BudgetPeriod};
use database::{Repository, TableRepository};
use rust_decimal::Decimal;

/// Makes sure the day, week and month budgets exist and records the current
/// spending in each of them.
///
/// Missing rows are created with a zero limit. The rows are returned in
/// day, week, month order.
pub async fn sync_budgets<R>(budgets: &mut R, summary: &SpendingSummary) -> Result<Vec<Budget>, AnalyticsError>
where
    R: Repository<Budget>,
{
    let mut synced = Vec::with_capacity(BudgetPeriod::ALL.len());
    for period in BudgetPeriod::ALL {
        let spent = summary.total(period);
        let budget = match budgets.get_by_pk(period.pk()).await? {
            Some(mut budget) => {
                budget.amount = spent;
                budgets.update_by_pk(&budget).await?;
                budget
            }
            None => {
                let mut budget = Budget::new(period, Decimal::ZERO);
                budget.amount = spent;
                let pk = budgets.add(&mut budget).await?;
                if pk != period.pk() {
                    tracing::warn!(%period, pk, expected = period.pk(), "Budget row stored under an unexpected key.");
                }
                budget
            }
        };
        synced.push(budget);
    }
    Ok(synced)
}

/// Replaces all budgets with fresh day, week and month limits.
///
/// The key counter is rewound so the rows land on keys 1, 2 and 3 again.
pub async fn reset_budgets(
    budgets: &mut TableRepository<Budget>,
    day: Decimal,
    week: Decimal,
    month: Decimal,
) -> Result<(), AnalyticsError> {
    budgets.delete_all().await?;
    budgets.set_next_pk(1);
    for (period, limit) in [(BudgetPeriod::Day, day), (BudgetPeriod::Week, week), (BudgetPeriod::Month, month)] {
        budgets.add(&mut Budget::new(period, limit)).await?;
    }
    Ok(())
}

/// The budget overview: one line per period.
pub fn budget_lines(budgets: &[Budget]) -> Vec<BudgetLine> {
    budgets.iter().map(Budget::table_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn budget_repo(dir: &tempfile::TempDir) -> TableRepository<Budget> {
        TableRepository::new(dir.path().join("budget.db"), "budget_table").await.unwrap()
    }

    #[tokio::test]
    async fn creates_missing_rows_then_updates_spending() {
        let dir = tempfile::tempdir().unwrap();
        let mut budgets = budget_repo(&dir).await;

        let summary = SpendingSummary { day: dec!(10), week: dec!(30), month: dec!(90) };
        let first = sync_budgets(&mut budgets, &summary).await.unwrap();
        assert_eq!(first.iter().map(|b| b.pk).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(first.iter().all(|b| b.budget == Decimal::ZERO));

        let later = SpendingSummary { day: dec!(0), week: dec!(45), month: dec!(105) };
        let second = sync_budgets(&mut budgets, &later).await.unwrap();
        assert_eq!(second[1].amount, dec!(45));
        assert_eq!(budgets.get_by_pk(3).await.unwrap().unwrap().amount, dec!(105));
        assert_eq!(budgets.get_all(&[], &[]).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn reset_reuses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut budgets = budget_repo(&dir).await;
        sync_budgets(&mut budgets, &SpendingSummary::default()).await.unwrap();

        reset_budgets(&mut budgets, dec!(100), dec!(500), dec!(2000)).await.unwrap();
        let summary = SpendingSummary { day: dec!(40), week: dec!(40), month: dec!(40) };
        let synced = sync_budgets(&mut budgets, &summary).await.unwrap();

        let lines = budget_lines(&synced);
        assert_eq!(lines[0].period, BudgetPeriod::Day);
        assert_eq!(lines[0].remaining, dec!(60));
        assert_eq!(lines[2].budget, dec!(2000));
        assert_eq!(lines[2].remaining, dec!(1960));
        assert_eq!(budgets.next_pk(), 4);
    }
}
