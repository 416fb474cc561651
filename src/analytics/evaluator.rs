use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::aggregate::{monthly_category_sum, ExpenseRecord};
use crate::models::Budget;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub category: String,
    pub limit_amount: Decimal,
    pub spent_this_calendar_month: Decimal,
    pub ratio: f64,
    pub over_limit: bool,
}

/// Compares a budget against its category's spend in the calendar month
/// containing `today`.
pub fn evaluate(budget: &Budget, expenses: &[ExpenseRecord], today: NaiveDate) -> BudgetStatus {
    let spent = monthly_category_sum(expenses, &budget.category, today.year(), today.month());

    BudgetStatus {
        budget_id: budget.id,
        category: budget.category.clone(),
        limit_amount: budget.limit_amount,
        spent_this_calendar_month: spent,
        ratio: spend_ratio(spent, budget.limit_amount),
        over_limit: spent > budget.limit_amount,
    }
}

pub fn evaluate_all(budgets: &[Budget], expenses: &[ExpenseRecord], today: NaiveDate) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| evaluate(budget, expenses, today))
        .collect()
}

/// `spent / limit` clamped to `[0, 1]`; a non-positive limit yields 0.
fn spend_ratio(spent: Decimal, limit: Decimal) -> f64 {
    if limit <= Decimal::ZERO {
        return 0.0;
    }

    // A quotient too large for `Decimal` is far past the limit.
    let ratio = match spent.checked_div(limit) {
        Some(ratio) => ratio.to_f64().unwrap_or(0.0),
        None if spent > Decimal::ZERO => 1.0,
        None => 0.0,
    };
    ratio.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn budget(category: &str, limit: &str) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category: category.to_string(),
            limit_amount: limit.parse().unwrap(),
            renewed_period: None,
            renewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn spend(category: &str, amount: &str, date: NaiveDate) -> ExpenseRecord {
        ExpenseRecord::new(category, amount.parse::<Decimal>().unwrap(), date)
    }

    fn march(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn spending_exactly_the_limit_is_not_over() {
        let expenses = vec![spend("Food", "300", march(2)), spend("Food", "200", march(9))];
        let status = evaluate(&budget("Food", "500"), &expenses, march(15));

        assert_eq!(status.spent_this_calendar_month, Decimal::new(500, 0));
        assert!(!status.over_limit);
        assert_eq!(status.ratio, 1.0);
    }

    #[test]
    fn one_cent_over_is_over() {
        let expenses = vec![spend("Food", "500.01", march(2))];
        let status = evaluate(&budget("Food", "500"), &expenses, march(15));

        assert!(status.over_limit);
        assert_eq!(status.ratio, 1.0);
    }

    #[test]
    fn ratio_clamps_at_one() {
        let expenses = vec![spend("Food", "1000", march(2))];
        let status = evaluate(&budget("Food", "500"), &expenses, march(15));

        assert_eq!(status.ratio, 1.0);
        assert!(status.over_limit);
    }

    #[test]
    fn partial_spend_gives_fractional_ratio() {
        let expenses = vec![spend("Food", "125", march(2))];
        let status = evaluate(&budget("Food", "500"), &expenses, march(15));

        assert_eq!(status.ratio, 0.25);
    }

    #[test]
    fn zero_or_negative_limit_yields_zero_ratio() {
        let expenses = vec![spend("Food", "40", march(2))];

        let zero = evaluate(&budget("Food", "0"), &expenses, march(15));
        assert_eq!(zero.ratio, 0.0);
        assert!(zero.over_limit);

        let negative = evaluate(&budget("Food", "-10"), &expenses, march(15));
        assert_eq!(negative.ratio, 0.0);
    }

    #[test]
    fn tiny_limit_with_large_spend_is_fully_used() {
        let expenses = vec![spend("Food", "1000000", march(2))];
        let status = evaluate(&budget("Food", "0.0000000000000000000000000001"), &expenses, march(15));

        assert_eq!(status.ratio, 1.0);
        assert!(status.over_limit);
    }

    #[test]
    fn only_the_current_calendar_month_counts() {
        let expenses = vec![
            spend("Food", "100", march(31)),
            spend("Food", "70", NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()),
            spend("Travel", "999", march(3)),
        ];
        let status = evaluate(&budget("Food", "500"), &expenses, march(1));

        assert_eq!(status.spent_this_calendar_month, Decimal::new(100, 0));
    }

    #[test]
    fn evaluate_all_preserves_budget_order() {
        let budgets = vec![budget("Travel", "50"), budget("Food", "10")];
        let expenses = vec![spend("Food", "20", march(2))];

        let statuses = evaluate_all(&budgets, &expenses, march(20));
        assert_eq!(statuses[0].category, "Travel");
        assert!(!statuses[0].over_limit);
        assert!(statuses[1].over_limit);
    }
}
