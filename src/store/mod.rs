//! Persistence seams. Handlers and the rollover job only see these traits;
//! `postgres` backs them in production and `memory` in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Budget, Expense, ExpenseChanges, NewExpense, Renewal, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Resource not found")]
    NotFound,

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// All expenses of one user, newest first.
    async fn list_expenses(&self, user_id: Uuid) -> StoreResult<Vec<Expense>>;

    async fn create_expense(&self, user_id: Uuid, expense: NewExpense) -> StoreResult<Expense>;

    /// Fails with `NotFound` when the id does not exist or belongs to another user.
    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> StoreResult<Expense>;

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> StoreResult<Expense>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>>;

    /// Fails with `Duplicate` when the user already budgets this category.
    async fn create_budget(
        &self,
        user_id: Uuid,
        category: &str,
        limit_amount: Decimal,
    ) -> StoreResult<Budget>;

    async fn update_budget_limit(
        &self,
        user_id: Uuid,
        id: Uuid,
        limit_amount: Decimal,
    ) -> StoreResult<Budget>;

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> StoreResult<Budget>;

    /// Every budget row across all users.
    async fn all_budgets(&self) -> StoreResult<Vec<Budget>>;

    /// Carries the limit forward into `period` and stamps the row. A row that
    /// already carries `period` is left alone.
    async fn renew_budget(&self, id: Uuid, period: &str) -> StoreResult<Renewal>;
}

pub const DUPLICATE_BUDGET: &str = "Budget for this category already exists";
pub const DUPLICATE_EMAIL: &str = "Email already registered";
