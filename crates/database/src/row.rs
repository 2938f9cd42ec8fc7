use crate::error::ValidationError;
use crate::schema::{Column, ColumnType, Record, Value};
use chrono::NaiveDateTime;
use core_types::{Expense, TIMESTAMP_FORMAT};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// An expense in the shape it is stored in: field names match the columns of
/// the expense table, and both timestamps are already rendered as text.
///
/// All checks happen when the row is built. Later field assignments are not
/// re-validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseRow {
    pub pk: i64,
    pub added_date: String,
    pub expense_date: String,
    pub category: i64,
    pub amount: f64,
    pub comment: String,
}

static EXPENSE_COLUMNS: [Column<ExpenseRow>; 6] = [
    Column {
        name: "pk",
        kind: ColumnType::IntegerPrimaryKey,
        get: |row| Value::Integer(row.pk),
        set: |row, value| {
            row.pk = value.into_integer("pk")?;
            Ok(())
        },
    },
    Column {
        name: "added_date",
        kind: ColumnType::Timestamp,
        get: |row| Value::Text(row.added_date.clone()),
        set: |row, value| {
            row.added_date = value.into_timestamp("added_date")?;
            Ok(())
        },
    },
    Column {
        name: "expense_date",
        kind: ColumnType::Timestamp,
        get: |row| Value::Text(row.expense_date.clone()),
        set: |row, value| {
            row.expense_date = value.into_timestamp("expense_date")?;
            Ok(())
        },
    },
    // Stored as TEXT; the setter turns it back into an integer key.
    Column {
        name: "category",
        kind: ColumnType::Text,
        get: |row| Value::Integer(row.category),
        set: |row, value| {
            row.category = value.into_integer("category")?;
            Ok(())
        },
    },
    Column {
        name: "amount",
        kind: ColumnType::Real,
        get: |row| Value::Real(row.amount),
        set: |row, value| {
            row.amount = non_negative_amount(value.into_real("amount")?)?;
            Ok(())
        },
    },
    Column {
        name: "comment",
        kind: ColumnType::Text,
        get: |row| Value::Text(row.comment.clone()),
        set: |row, value| {
            row.comment = value.into_text("comment")?;
            Ok(())
        },
    },
];

impl Record for ExpenseRow {
    fn columns() -> &'static [Column<Self>] {
        &EXPENSE_COLUMNS
    }
}

fn non_negative_amount(amount: f64) -> Result<f64, ValidationError> {
    if amount < 0.0 {
        return Err(ValidationError::Negative { field: "amount", value: amount.to_string() });
    }
    Ok(amount)
}

impl ExpenseRow {
    /// Converts a domain expense into its storage shape.
    ///
    /// Fails on a negative amount, or one that cannot be represented as a
    /// finite floating-point number.
    pub fn new(expense: &Expense) -> Result<Self, ValidationError> {
        if expense.amount < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "amount",
                value: expense.amount.to_string(),
            });
        }
        let amount = expense
            .amount
            .to_f64()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| ValidationError::NotNumeric {
                field: "amount",
                found: expense.amount.to_string(),
            })?;

        Ok(Self {
            pk: expense.pk,
            added_date: expense.added_date.format(TIMESTAMP_FORMAT).to_string(),
            expense_date: expense.expense_date.format(TIMESTAMP_FORMAT).to_string(),
            category: expense.category,
            amount,
            comment: expense.comment.clone(),
        })
    }

    /// Builds a row from loosely typed field values, in column order
    /// (`pk, added_date, expense_date, category, amount, comment`).
    ///
    /// Every value goes through the same checks used when rows are read back
    /// from the table, so either all fields are accepted or none are.
    pub fn from_fields(values: Vec<Value>) -> Result<Self, ValidationError> {
        if values.len() != EXPENSE_COLUMNS.len() {
            return Err(ValidationError::FieldCount {
                expected: EXPENSE_COLUMNS.len(),
                found: values.len(),
            });
        }
        let names = EXPENSE_COLUMNS.iter().map(|column| column.name);
        Self::from_values(names.zip(values))
    }

    /// Converts the row back into a domain expense.
    pub fn to_expense(&self) -> Result<Expense, ValidationError> {
        let parse = |field: &'static str, text: &str| {
            NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|_| {
                ValidationError::BadTimestamp { field, found: text.to_string() }
            })
        };
        let amount = Decimal::from_f64(self.amount).ok_or_else(|| ValidationError::NotNumeric {
            field: "amount",
            found: self.amount.to_string(),
        })?;

        Ok(Expense {
            pk: self.pk,
            added_date: parse("added_date", &self.added_date)?,
            expense_date: parse("expense_date", &self.expense_date)?,
            category: self.category,
            amount,
            comment: self.comment.clone(),
        })
    }
}

impl TryFrom<&Expense> for ExpenseRow {
    type Error = ValidationError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        ExpenseRow::new(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2020-08-30 08:15:28", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn fields(category: Value, amount: Value, comment: Value, expense_date: Value) -> Vec<Value> {
        vec![
            Value::Integer(1),
            Value::Text("30-08-2020 08:15".into()),
            expense_date,
            category,
            amount,
            comment,
        ]
    }

    fn valid_date() -> Value {
        Value::Text("30-08-2020 08:15".into())
    }

    #[test]
    fn formats_timestamps_to_minute_precision() {
        let row = ExpenseRow::new(&Expense::new(dec!(10), 1, date())).unwrap();
        assert_eq!(row.expense_date, "30-08-2020 08:15");
        assert_eq!(row.category, 1);
        assert_eq!(row.amount, 10.0);
        assert_eq!(row.comment, "");
    }

    #[test]
    fn rejects_negative_amount() {
        let err = ExpenseRow::new(&Expense::new(dec!(-10), 10, date())).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "amount", .. }));
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert!(ExpenseRow::new(&Expense::new(dec!(0), 10, date())).is_ok());
    }

    #[test]
    fn rejects_non_integer_category() {
        for category in [Value::Text("cat".into()), Value::Real(10.9), Value::Null] {
            let err = ExpenseRow::from_fields(fields(
                category,
                Value::Integer(100),
                Value::Text(String::new()),
                valid_date(),
            ))
            .unwrap_err();
            assert!(matches!(err, ValidationError::NotInteger { field: "category", .. }));
        }
    }

    #[test]
    fn rejects_bad_amounts() {
        for amount in [Value::Text("100".into()), Value::Null] {
            let err = ExpenseRow::from_fields(fields(
                Value::Integer(10),
                amount,
                Value::Text(String::new()),
                valid_date(),
            ))
            .unwrap_err();
            assert!(matches!(err, ValidationError::NotNumeric { field: "amount", .. }));
        }
        let err = ExpenseRow::from_fields(fields(
            Value::Integer(10),
            Value::Integer(-10),
            Value::Text(String::new()),
            valid_date(),
        ))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Negative { field: "amount", .. }));
    }

    #[test]
    fn rejects_non_text_comment() {
        let err = ExpenseRow::from_fields(fields(
            Value::Integer(10),
            Value::Integer(1000),
            Value::Integer(100),
            valid_date(),
        ))
        .unwrap_err();
        assert!(matches!(err, ValidationError::NotText { field: "comment", .. }));
    }

    #[test]
    fn rejects_bad_expense_dates() {
        for expense_date in [
            Value::Integer(10),
            Value::Text("date".into()),
            Value::Real(10.9),
            Value::Null,
        ] {
            let err = ExpenseRow::from_fields(fields(
                Value::Integer(5),
                Value::Integer(100),
                Value::Text(String::new()),
                expense_date,
            ))
            .unwrap_err();
            assert!(matches!(err, ValidationError::BadTimestamp { field: "expense_date", .. }));
        }
    }

    #[test]
    fn rejects_wrong_number_of_fields() {
        let err = ExpenseRow::from_fields(vec![Value::Integer(1)]).unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { expected: 6, found: 1 });

        let mut long = fields(
            Value::Integer(1),
            Value::Integer(100),
            Value::Text(String::new()),
            valid_date(),
        );
        long.push(Value::Text("extra".into()));
        let err = ExpenseRow::from_fields(long).unwrap_err();
        assert_eq!(err, ValidationError::FieldCount { expected: 6, found: 7 });
    }

    #[test]
    fn category_kept_as_text_reads_back() {
        let row = ExpenseRow::from_fields(fields(
            Value::Text("3".into()),
            Value::Real(12.5),
            Value::Text("lunch".into()),
            valid_date(),
        ))
        .unwrap();
        assert_eq!(row.category, 3);
        assert_eq!(row.amount, 12.5);
    }

    #[test]
    fn converts_back_to_expense() {
        let expense = Expense::new(dec!(99.5), 2, date()).with_comment("books");
        let restored = ExpenseRow::new(&expense).unwrap().to_expense().unwrap();
        assert_eq!(restored.amount, dec!(99.5));
        assert_eq!(restored.category, 2);
        assert_eq!(restored.comment, "books");
        assert_eq!(restored.expense_date.format(TIMESTAMP_FORMAT).to_string(), "30-08-2020 08:15");
    }
}
