use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::analytics::RawAmount;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Amounts are stored as `NUMERIC(12, 2)`: at most ten integer digits and two
/// decimal places.
pub const AMOUNT_INTEGER_DIGITS: u32 = 10;
pub const AMOUNT_SCALE: u32 = 2;

fn amount_ceiling() -> Decimal {
    Decimal::from(10_i64.pow(AMOUNT_INTEGER_DIGITS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountProblem {
    NotNumeric,
    Negative,
    OutOfRange,
}

/// Strict check shared by every amount-bearing request field.
pub fn check_amount(amount: &RawAmount) -> Result<Decimal, AmountProblem> {
    let value = amount.parse().ok_or(AmountProblem::NotNumeric)?;
    if value < Decimal::ZERO {
        return Err(AmountProblem::Negative);
    }
    if value >= amount_ceiling() || value.normalize().scale() > AMOUNT_SCALE {
        return Err(AmountProblem::OutOfRange);
    }
    Ok(value)
}

fn amount_error(problem: AmountProblem, label: &'static str) -> ValidationError {
    let (code, message) = match problem {
        AmountProblem::NotNumeric => ("invalid_amount", "must be a number"),
        AmountProblem::Negative => ("negative_amount", "must not be negative"),
        AmountProblem::OutOfRange => (
            "amount_out_of_range",
            "must be below 10000000000 with at most 2 decimal places",
        ),
    };
    ValidationError::new(code).with_message(format!("{} {}", label, message).into())
}

pub fn validate_amount(amount: &RawAmount) -> Result<(), ValidationError> {
    check_amount(amount)
        .map(|_| ())
        .map_err(|problem| amount_error(problem, "Amount"))
}

pub fn validate_limit_amount(amount: &RawAmount) -> Result<(), ValidationError> {
    check_amount(amount)
        .map(|_| ())
        .map_err(|problem| amount_error(problem, "Limit amount"))
}

/// Validates a `YYYY-MM-DD` calendar date
pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    parse_date(date)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_date"))
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// One entry of the 400 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Flattens validator output into a list sorted by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut list: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();

    list.sort_by(|a, b| a.field.cmp(&b.field));
    list
}
