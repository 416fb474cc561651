use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{category_totals, daily_series, CategoryTotal, DailyTotal, ExpenseRecord};
use super::window::{DateRange, TimeWindow};

/// Everything the dashboard charts need for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub window: TimeWindow,
    pub range: Option<DateRange>,
    pub category: Option<String>,
    pub category_totals: Vec<CategoryTotal>,
    pub grand_total: Decimal,
    pub count: usize,
    pub daily_series: Vec<DailyTotal>,
}

/// Scopes `records` to `window` (and optionally one category) and aggregates.
pub fn summarize(
    records: &[ExpenseRecord],
    window: TimeWindow,
    category: Option<&str>,
    now: NaiveDateTime,
) -> DashboardSummary {
    let scoped: Vec<&ExpenseRecord> = records
        .iter()
        .filter(|record| window.admits(record.date, now))
        .filter(|record| category.map_or(true, |c| record.category == c))
        .collect();

    let totals = category_totals(scoped.iter().copied());

    DashboardSummary {
        window,
        range: window.resolve(now),
        category: category.map(str::to_string),
        category_totals: totals.totals,
        grand_total: totals.grand_total,
        count: totals.count,
        daily_series: daily_series(scoped.iter().copied()),
    }
}
