use chrono::NaiveDate;
use core_types::{BudgetPeriod, Expense};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Total spending for the day, ISO week and month around a reference date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub day: Decimal,
    pub week: Decimal,
    pub month: Decimal,
}

impl SpendingSummary {
    /// Adds up every expense whose `expense_date` falls into each period
    /// containing `today`.
    pub fn from_expenses(expenses: &[Expense], today: NaiveDate) -> Self {
        let mut summary = Self::default();
        for expense in expenses {
            let date = expense.expense_date.date();
            if BudgetPeriod::Day.contains(today, date) {
                summary.day += expense.amount;
            }
            if BudgetPeriod::Week.contains(today, date) {
                summary.week += expense.amount;
            }
            if BudgetPeriod::Month.contains(today, date) {
                summary.month += expense.amount;
            }
        }
        summary
    }

    pub fn total(&self, period: BudgetPeriod) -> Decimal {
        match period {
            BudgetPeriod::Day => self.day,
            BudgetPeriod::Week => self.week,
            BudgetPeriod::Month => self.month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spent(amount: Decimal, y: i32, m: u32, d: u32) -> Expense {
        let when = NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(9, 30, 0).unwrap();
        Expense::new(amount, 1, when)
    }

    #[test]
    fn buckets_expenses_by_period() {
        // Wednesday 2025-03-12 is in ISO week 11 (Mon 10th .. Sun 16th).
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let expenses = vec![
            spent(dec!(100), 2025, 3, 12),
            spent(dec!(50), 2025, 3, 12),
            spent(dec!(20), 2025, 3, 10),
            spent(dec!(7), 2025, 3, 2),
            spent(dec!(1000), 2025, 2, 12),
            spent(dec!(3), 2024, 3, 12),
        ];

        let summary = SpendingSummary::from_expenses(&expenses, today);
        assert_eq!(summary.day, dec!(150));
        assert_eq!(summary.week, dec!(170));
        assert_eq!(summary.month, dec!(177));
        assert_eq!(summary.total(BudgetPeriod::Week), dec!(170));
    }

    #[test]
    fn empty_input_is_all_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        assert_eq!(SpendingSummary::from_expenses(&[], today), SpendingSummary::default());
    }
}
