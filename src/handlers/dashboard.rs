use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use askama::Template;
use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    analytics::{
        evaluate_all, summarize, BudgetStatus, DailyTotal, DashboardSummary, TimeWindow,
    },
    app::AppState,
    error::AppError,
    filters,
    handlers::expenses::WindowQuery,
    middleware::CurrentUser,
    models::{to_records, Expense},
};

struct WindowLink {
    tag: &'static str,
    label: &'static str,
    selected: bool,
}

struct CategoryRow {
    category: String,
    total: Decimal,
    href: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user_name: String,
    window_label: &'static str,
    range_label: String,
    windows: Vec<WindowLink>,
    category: Option<String>,
    categories: Vec<CategoryRow>,
    grand_total: Decimal,
    count: usize,
    daily: Vec<DailyTotal>,
    expenses: Vec<Expense>,
    budgets: Vec<BudgetStatus>,
}

/// Chart data for the selected window.
pub async fn summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let window = query.window()?;
    let expenses = state.expenses.list_expenses(current_user.id).await?;
    let now = Local::now().naive_local();

    Ok(Json(summarize(&to_records(&expenses), window, query.category(), now)))
}

/// Server-rendered dashboard. The same window scopes the expense list and
/// the totals; the budget table always reflects the current calendar month.
pub async fn dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WindowQuery>,
) -> Result<Html<String>, AppError> {
    let window = query.window()?;
    let now = Local::now().naive_local();

    let user = state
        .users
        .find_user(current_user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let expenses = state.expenses.list_expenses(current_user.id).await?;
    let budgets = state.budgets.list_budgets(current_user.id).await?;

    let records = to_records(&expenses);
    let summary = summarize(&records, window, query.category(), now);
    let statuses = evaluate_all(&budgets, &records, now.date());

    let visible: Vec<Expense> = expenses
        .into_iter()
        .filter(|e| window.admits(Some(e.date), now))
        .filter(|e| query.category().map_or(true, |c| e.category == c))
        .collect();

    let template = DashboardTemplate {
        user_name: user.name,
        window_label: window.label(),
        range_label: range_label(window, now),
        windows: TimeWindow::ALL
            .into_iter()
            .map(|w| WindowLink {
                tag: w.tag(),
                label: w.label(),
                selected: w == window,
            })
            .collect(),
        category: summary.category.clone(),
        categories: summary
            .category_totals
            .iter()
            .map(|t| CategoryRow {
                category: t.category.clone(),
                total: t.total,
                href: format!(
                    "/dashboard?window={}&category={}",
                    window.tag(),
                    urlencoding::encode(&t.category)
                ),
            })
            .collect(),
        grand_total: summary.grand_total,
        count: summary.count,
        daily: summary.daily_series,
        expenses: visible,
        budgets: statuses,
    };

    Ok(Html(template.render()?))
}

fn range_label(window: TimeWindow, now: NaiveDateTime) -> String {
    match window.resolve(now) {
        Some(range) => format!(
            "{} to {}",
            range.start.date().format("%Y-%m-%d"),
            range.end.date().format("%Y-%m-%d")
        ),
        None => "Every recorded expense".to_string(),
    }
}
