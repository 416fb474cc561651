use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::amount::{coerce_amount, RawAmount};
use super::window::TimeWindow;

/// One expense as seen by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub category: String,
    pub amount: RawAmount,
    pub date: Option<NaiveDate>,
}

impl ExpenseRecord {
    pub fn new(category: impl Into<String>, amount: impl Into<RawAmount>, date: NaiveDate) -> Self {
        Self {
            category: category.into(),
            amount: amount.into(),
            date: Some(date),
        }
    }

    pub fn amount(&self) -> Decimal {
        coerce_amount(&self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoryTotals {
    /// Categories in the order they were first seen.
    pub totals: Vec<CategoryTotal>,
    pub grand_total: Decimal,
    pub count: usize,
}

impl CategoryTotals {
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.totals
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub total: Decimal,
}

/// Keeps only the records admitted by `window` at `now`.
pub fn filter_by_window<'a>(
    records: &'a [ExpenseRecord],
    window: TimeWindow,
    now: NaiveDateTime,
) -> Vec<&'a ExpenseRecord> {
    records
        .iter()
        .filter(|record| window.admits(record.date, now))
        .collect()
}

/// Sums amounts per category over an already-filtered collection. Sums that
/// would overflow saturate at `Decimal::MAX`.
pub fn category_totals<'a, I>(records: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut result = CategoryTotals::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let amount = record.amount();
        let position = *positions.entry(record.category.as_str()).or_insert_with(|| {
            result.totals.push(CategoryTotal {
                category: record.category.clone(),
                total: Decimal::ZERO,
            });
            result.totals.len() - 1
        });

        let entry = &mut result.totals[position];
        entry.total = entry.total.saturating_add(amount);
        result.grand_total = result.grand_total.saturating_add(amount);
        result.count += 1;
    }

    result
}

/// Per-day totals in ascending date order. Days without expenses are absent,
/// and undated records are skipped.
pub fn daily_series<'a, I>(records: I) -> Vec<DailyTotal>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for record in records {
        if let Some(day) = record.date {
            let total = days.entry(day).or_insert(Decimal::ZERO);
            *total = total.saturating_add(record.amount());
        }
    }

    days.into_iter()
        .map(|(day, total)| DailyTotal { day, total })
        .collect()
}

/// Spend for one category in one calendar month, ignoring any display window.
pub fn monthly_category_sum(
    records: &[ExpenseRecord],
    category: &str,
    year: i32,
    month: u32,
) -> Decimal {
    records
        .iter()
        .filter(|record| record.category == category)
        .filter(|record| {
            record
                .date
                .map_or(false, |d| d.year() == year && d.month() == month)
        })
        .map(ExpenseRecord::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
