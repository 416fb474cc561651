use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    analytics::{TimeWindow, UnknownWindow},
    app::AppState,
    error::AppError,
    middleware::CurrentUser,
    models::{
        CreateExpense, Expense, ExpenseChanges, NewExpense, UpdateExpense, PREDEFINED_CATEGORIES,
    },
    validation::parse_date,
};

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub window: Option<String>,
    pub category: Option<String>,
}

impl WindowQuery {
    /// The requested tag; an empty `?window=` counts as absent.
    fn window_tag(&self) -> Option<&str> {
        self.window.as_deref().map(str::trim).filter(|w| !w.is_empty())
    }

    pub fn has_window(&self) -> bool {
        self.window_tag().is_some()
    }

    /// Defaults to `this-month`; an unknown tag is a validation error.
    pub fn window(&self) -> Result<TimeWindow, AppError> {
        match self.window_tag() {
            None => Ok(TimeWindow::default()),
            Some(tag) => tag
                .parse()
                .map_err(|e: UnknownWindow| AppError::field("window", &e.to_string())),
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedExpense {
    pub message: &'static str,
    pub expense: Expense,
}

/// Lists the caller's expenses. Without `?window=` every expense is returned.
pub async fn list_expenses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let mut expenses = state.expenses.list_expenses(current_user.id).await?;

    if query.has_window() {
        let window = query.window()?;
        let now = Local::now().naive_local();
        expenses.retain(|e| window.admits(Some(e.date), now));
    }

    Ok(Json(expenses))
}

pub async fn create_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateExpense>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let (amount, date) = match (form.amount.parse(), parse_date(&form.date)) {
        (Some(a), Some(d)) => (a, d),
        _ => return Err(AppError::field("amount", "Amount must be a number")),
    };

    let expense = NewExpense {
        category: form.category.trim().to_string(),
        amount,
        date,
        description: form.description,
        is_recurring: form.is_recurring.unwrap_or(false),
    };

    let expense = state.expenses.create_expense(current_user.id, expense).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
    payload: Result<Json<UpdateExpense>, JsonRejection>,
) -> Result<Json<Expense>, AppError> {
    let Json(form) = payload?;
    form.validate()?;

    let changes = ExpenseChanges {
        category: form.category.map(|c| c.trim().to_string()),
        amount: form.amount.as_ref().and_then(|a| a.parse()),
        date: form.date.as_deref().and_then(parse_date),
        description: form.description,
        is_recurring: form.is_recurring,
    };

    let expense = state
        .expenses
        .update_expense(current_user.id, expense_id, changes)
        .await
        .map_err(AppError::not_found("Expense not found or not authorized"))?;

    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<DeletedExpense>, AppError> {
    let expense = state
        .expenses
        .delete_expense(current_user.id, expense_id)
        .await
        .map_err(AppError::not_found("Expense not found or not authorized"))?;

    Ok(Json(DeletedExpense {
        message: "Expense deleted",
        expense,
    }))
}

pub async fn categories() -> Json<Vec<&'static str>> {
    Json(PREDEFINED_CATEGORIES.to_vec())
}
