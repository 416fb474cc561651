use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BudgetStore, ExpenseStore, StoreError, StoreResult, UserStore, DUPLICATE_BUDGET,
    DUPLICATE_EMAIL,
};
use crate::models::{Budget, Expense, ExpenseChanges, NewExpense, Renewal, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    expenses: Vec<Expense>,
    budgets: Vec<Budget>,
}

/// Process-local store with the same contracts as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn budget_count(&self) -> usize {
        self.tables.read().await.budgets.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate(DUPLICATE_EMAIL.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn list_expenses(&self, user_id: Uuid) -> StoreResult<Vec<Expense>> {
        let tables = self.tables.read().await;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn create_expense(&self, user_id: Uuid, expense: NewExpense) -> StoreResult<Expense> {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id,
            category: expense.category,
            amount: expense.amount,
            date: expense.date,
            description: expense.description,
            is_recurring: expense.is_recurring,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> StoreResult<Expense> {
        let mut tables = self.tables.write().await;
        let expense = tables
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        expense.apply(changes);
        Ok(expense.clone())
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> StoreResult<Expense> {
        let mut tables = self.tables.write().await;
        let position = tables
            .expenses
            .iter()
            .position(|e| e.id == id && e.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        Ok(tables.expenses.remove(position))
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        let tables = self.tables.read().await;
        Ok(tables
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_budget(
        &self,
        user_id: Uuid,
        category: &str,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        let mut tables = self.tables.write().await;
        if tables
            .budgets
            .iter()
            .any(|b| b.user_id == user_id && b.category == category)
        {
            return Err(StoreError::Duplicate(DUPLICATE_BUDGET.to_string()));
        }

        let budget = Budget {
            id: Uuid::new_v4(),
            user_id,
            category: category.to_string(),
            limit_amount,
            renewed_period: None,
            renewed_at: None,
            created_at: Utc::now(),
        };
        tables.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn update_budget_limit(
        &self,
        user_id: Uuid,
        id: Uuid,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        let mut tables = self.tables.write().await;
        let budget = tables
            .budgets
            .iter_mut()
            .find(|b| b.id == id && b.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        budget.limit_amount = limit_amount;
        Ok(budget.clone())
    }

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> StoreResult<Budget> {
        let mut tables = self.tables.write().await;
        let position = tables
            .budgets
            .iter()
            .position(|b| b.id == id && b.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        Ok(tables.budgets.remove(position))
    }

    async fn all_budgets(&self) -> StoreResult<Vec<Budget>> {
        Ok(self.tables.read().await.budgets.clone())
    }

    async fn renew_budget(&self, id: Uuid, period: &str) -> StoreResult<Renewal> {
        let mut tables = self.tables.write().await;
        let budget = tables
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound)?;

        if budget.renewed_period.as_deref() == Some(period) {
            return Ok(Renewal::AlreadyCurrent);
        }

        budget.renewed_period = Some(period.to_string());
        budget.renewed_at = Some(Utc::now());
        Ok(Renewal::Renewed)
    }
}
