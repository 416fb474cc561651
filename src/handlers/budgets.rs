use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    analytics::{evaluate_all, BudgetStatus},
    app::AppState,
    error::AppError,
    middleware::CurrentUser,
    models::{to_records, Budget, CreateBudget, UpdateBudget},
};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<Budget>>, AppError> {
    let budgets = state.budgets.list_budgets(current_user.id).await?;
    Ok(Json(budgets))
}

pub async fn create_budget(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateBudget>, JsonRejection>,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let limit_amount = form
        .limit_amount
        .parse()
        .ok_or_else(|| AppError::field("limit_amount", "Limit amount must be a number"))?;

    let budget = state
        .budgets
        .create_budget(current_user.id, form.category.trim(), limit_amount)
        .await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn update_budget(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(budget_id): Path<Uuid>,
    payload: Result<Json<UpdateBudget>, JsonRejection>,
) -> Result<Json<Budget>, AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let limit_amount = form
        .limit_amount
        .parse()
        .ok_or_else(|| AppError::field("limit_amount", "Limit amount must be a number"))?;

    let budget = state
        .budgets
        .update_budget_limit(current_user.id, budget_id, limit_amount)
        .await
        .map_err(AppError::not_found("Budget not found"))?;

    Ok(Json(budget))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    state
        .budgets
        .delete_budget(current_user.id, budget_id)
        .await
        .map_err(AppError::not_found("Budget not found"))?;

    Ok(Json(Message {
        message: "Budget deleted successfully",
    }))
}

/// Spend-vs-limit for each of the caller's budgets in one calendar month.
pub async fn budget_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<BudgetStatus>>, AppError> {
    let reference = match query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        None => Local::now().date_naive(),
        Some(month) => parse_month(month)
            .ok_or_else(|| AppError::field("month", "Month must be formatted as YYYY-MM"))?,
    };

    let budgets = state.budgets.list_budgets(current_user.id).await?;
    let expenses = state.expenses.list_expenses(current_user.id).await?;

    Ok(Json(evaluate_all(&budgets, &to_records(&expenses), reference)))
}

fn parse_month(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()
}
