use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    analytics::RawAmount,
    validation::{validate_limit_amount, validate_not_blank},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub limit_amount: Decimal,
    /// `YYYY-MM` of the last monthly renewal.
    pub renewed_period: Option<String>,
    pub renewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBudget {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Category is required"))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_limit_amount"))]
    pub limit_amount: RawAmount,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBudget {
    #[serde(default)]
    #[validate(custom(function = "validate_limit_amount"))]
    pub limit_amount: RawAmount,
}

/// Outcome of renewing one budget row for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renewal {
    Renewed,
    AlreadyCurrent,
}
