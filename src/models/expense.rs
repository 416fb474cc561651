use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    analytics::{ExpenseRecord, RawAmount},
    validation::{validate_amount, validate_date, validate_not_blank},
};

/// Suggested categories offered to clients. Any other text is accepted too.
pub const PREDEFINED_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Housing",
    "Utilities",
    "Entertainment",
    "Health",
    "Shopping",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRecord {
    fn from(expense: &Expense) -> Self {
        ExpenseRecord {
            category: expense.category.clone(),
            amount: RawAmount::Number(expense.amount),
            date: Some(expense.date),
        }
    }
}

pub fn to_records(expenses: &[Expense]) -> Vec<ExpenseRecord> {
    expenses.iter().map(ExpenseRecord::from).collect()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpense {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub amount: RawAmount,
    #[serde(default)]
    #[validate(custom(function = "validate_date", message = "Date must be valid"))]
    pub date: String,
    pub description: Option<String>,
    pub is_recurring: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpense {
    #[validate(custom(function = "validate_not_blank", message = "Category must not be empty"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<RawAmount>,
    #[validate(custom(function = "validate_date", message = "Date must be valid"))]
    pub date: Option<String>,
    pub description: Option<String>,
    pub is_recurring: Option<bool>,
}

/// A validated, typed expense write. Absent fields on update keep the stored
/// value.
#[derive(Debug, Clone, Default)]
pub struct ExpenseChanges {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub is_recurring: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub is_recurring: bool,
}

impl Expense {
    pub fn apply(&mut self, changes: ExpenseChanges) {
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if let Some(is_recurring) = changes.is_recurring {
            self.is_recurring = is_recurring;
        }
        self.updated_at = Utc::now();
    }
}
