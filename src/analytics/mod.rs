//! Budget and expense aggregation.
//!
//! Everything here is a pure function over data already loaded for one user:
//! window resolution, per-category and per-day totals, and budget evaluation.

pub mod aggregate;
pub mod amount;
pub mod evaluator;
pub mod summary;
pub mod window;

pub use aggregate::{
    category_totals, daily_series, filter_by_window, monthly_category_sum, CategoryTotal,
    CategoryTotals, DailyTotal, ExpenseRecord,
};
pub use amount::{coerce_amount, RawAmount};
pub use evaluator::{evaluate, evaluate_all, BudgetStatus};
pub use summary::{summarize, DashboardSummary};
pub use window::{DateRange, TimeWindow, UnknownWindow};
