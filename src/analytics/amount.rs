use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An amount as it arrived, before any numeric interpretation.
///
/// JSON numbers and numeric strings land in `Number`; anything else that is a
/// string lands in `Text`; `null` or an absent field is `Missing`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
    #[default]
    Missing,
}

impl RawAmount {
    /// Strict interpretation used by request validation.
    pub fn parse(&self) -> Option<Decimal> {
        match self {
            RawAmount::Number(value) => Some(*value),
            RawAmount::Text(text) => Decimal::from_str(text.trim()).ok(),
            RawAmount::Missing => None,
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

/// Lenient amount policy for aggregation: anything that does not parse as a
/// decimal counts as zero.
pub fn coerce_amount(raw: &RawAmount) -> Decimal {
    raw.parse().unwrap_or(Decimal::ZERO)
}
