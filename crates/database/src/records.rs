//! Column declarations for the domain types that are stored as-is.

use crate::error::ValidationError;
use crate::schema::{Column, ColumnType, Record, Value};
use core_types::{Budget, BudgetPeriod, Category};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

static CATEGORY_COLUMNS: [Column<Category>; 3] = [
    Column {
        name: "pk",
        kind: ColumnType::IntegerPrimaryKey,
        get: |category| Value::Integer(category.pk),
        set: |category, value| {
            category.pk = value.into_integer("pk")?;
            Ok(())
        },
    },
    Column {
        name: "name",
        kind: ColumnType::Text,
        get: |category| Value::Text(category.name.clone()),
        set: |category, value| {
            category.name = value.into_text("name")?;
            Ok(())
        },
    },
    Column {
        name: "parent",
        kind: ColumnType::Integer,
        get: |category| category.parent.into(),
        set: |category, value| {
            category.parent = value.into_optional_integer("parent")?;
            Ok(())
        },
    },
];

impl Record for Category {
    fn columns() -> &'static [Column<Self>] {
        &CATEGORY_COLUMNS
    }
}

static BUDGET_COLUMNS: [Column<Budget>; 4] = [
    Column {
        name: "pk",
        kind: ColumnType::IntegerPrimaryKey,
        get: |budget| Value::Integer(budget.pk),
        set: |budget, value| {
            budget.pk = value.into_integer("pk")?;
            Ok(())
        },
    },
    Column {
        name: "period",
        kind: ColumnType::Text,
        get: |budget| Value::Text(budget.period.to_string()),
        set: |budget, value| {
            let label = value.into_text("period")?;
            budget.period = label
                .parse::<BudgetPeriod>()
                .map_err(|_| ValidationError::Unsupported { field: "period", found: label })?;
            Ok(())
        },
    },
    Column {
        name: "budget",
        kind: ColumnType::Real,
        get: |budget| money_to_value(budget.budget),
        set: |budget, value| {
            budget.budget = money_from_value("budget", value)?;
            Ok(())
        },
    },
    Column {
        name: "amount",
        kind: ColumnType::Real,
        get: |budget| money_to_value(budget.amount),
        set: |budget, value| {
            budget.amount = money_from_value("amount", value)?;
            Ok(())
        },
    },
];

impl Record for Budget {
    fn columns() -> &'static [Column<Self>] {
        &BUDGET_COLUMNS
    }
}

// REAL columns hold money as f64; amounts are small enough for the round trip.
fn money_to_value(amount: Decimal) -> Value {
    amount.to_f64().map(Value::Real).unwrap_or(Value::Null)
}

fn money_from_value(field: &'static str, value: Value) -> Result<Decimal, ValidationError> {
    let raw = value.into_real(field)?;
    Decimal::from_f64(raw).ok_or_else(|| ValidationError::NotNumeric { field, found: raw.to_string() })
}
