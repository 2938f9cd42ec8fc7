use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The accounting period a `Budget` row covers.
///
/// Each period owns a fixed primary key in the budget table, so the three rows
/// can be addressed directly without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Day,
    Week,
    Month,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 3] = [BudgetPeriod::Day, BudgetPeriod::Week, BudgetPeriod::Month];

    /// Returns the primary key reserved for this period (1 = day, 2 = week, 3 = month).
    pub fn pk(&self) -> i64 {
        match self {
            BudgetPeriod::Day => 1,
            BudgetPeriod::Week => 2,
            BudgetPeriod::Month => 3,
        }
    }

    /// True when `date` falls in the same period as `reference`: the same day,
    /// the same ISO week, or the same calendar month.
    pub fn contains(&self, reference: NaiveDate, date: NaiveDate) -> bool {
        match self {
            BudgetPeriod::Day => date == reference,
            BudgetPeriod::Week => date.iso_week() == reference.iso_week(),
            BudgetPeriod::Month => date.year() == reference.year() && date.month() == reference.month(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Day => "day",
            BudgetPeriod::Week => "week",
            BudgetPeriod::Month => "month",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(BudgetPeriod::Day),
            "week" => Ok(BudgetPeriod::Week),
            "month" => Ok(BudgetPeriod::Month),
            other => Err(CoreError::InvalidInput("period".to_string(), other.to_string())),
        }
    }
}
