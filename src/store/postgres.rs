use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    BudgetStore, ExpenseStore, StoreError, StoreResult, UserStore, DUPLICATE_BUDGET,
    DUPLICATE_EMAIL,
};
use crate::{
    database::Database,
    models::{Budget, Expense, ExpenseChanges, NewExpense, Renewal, User},
};

/// PostgreSQL implementation of every store trait over one pool.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn duplicate_or(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| duplicate_or(e, DUPLICATE_EMAIL))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn list_expenses(&self, user_id: Uuid) -> StoreResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(expenses)
    }

    async fn create_expense(&self, user_id: Uuid, expense: NewExpense) -> StoreResult<Expense> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, category, amount, date, description, is_recurring)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&expense.category)
        .bind(expense.amount)
        .bind(expense.date)
        .bind(&expense.description)
        .bind(expense.is_recurring)
        .fetch_one(&self.db)
        .await?;
        Ok(expense)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> StoreResult<Expense> {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses SET
                category = COALESCE($1, category),
                amount = COALESCE($2, amount),
                date = COALESCE($3, date),
                description = COALESCE($4, description),
                is_recurring = COALESCE($5, is_recurring),
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(changes.category)
        .bind(changes.amount)
        .bind(changes.date)
        .bind(changes.description)
        .bind(changes.is_recurring)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> StoreResult<Expense> {
        sqlx::query_as::<_, Expense>(
            "DELETE FROM expenses WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl BudgetStore for PgStore {
    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        let budgets = sqlx::query_as::<_, Budget>(
            "SELECT * FROM budgets WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(budgets)
    }

    async fn create_budget(
        &self,
        user_id: Uuid,
        category: &str,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM budgets WHERE user_id = $1 AND category = $2",
        )
        .bind(user_id)
        .bind(category)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(StoreError::Duplicate(DUPLICATE_BUDGET.to_string()));
        }

        // The unique index still catches a concurrent insert of the same category.
        sqlx::query_as::<_, Budget>(
            r#"
            INSERT INTO budgets (user_id, category, limit_amount)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(limit_amount)
        .fetch_one(&self.db)
        .await
        .map_err(|e| duplicate_or(e, DUPLICATE_BUDGET))
    }

    async fn update_budget_limit(
        &self,
        user_id: Uuid,
        id: Uuid,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        sqlx::query_as::<_, Budget>(
            "UPDATE budgets SET limit_amount = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(limit_amount)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> StoreResult<Budget> {
        sqlx::query_as::<_, Budget>(
            "DELETE FROM budgets WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn all_budgets(&self) -> StoreResult<Vec<Budget>> {
        let budgets = sqlx::query_as::<_, Budget>("SELECT * FROM budgets ORDER BY created_at")
            .fetch_all(&self.db)
            .await?;
        Ok(budgets)
    }

    async fn renew_budget(&self, id: Uuid, period: &str) -> StoreResult<Renewal> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET limit_amount = limit_amount, renewed_period = $2, renewed_at = NOW()
            WHERE id = $1 AND renewed_period IS DISTINCT FROM $2
            "#,
        )
        .bind(id)
        .bind(period)
        .execute(&self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(Renewal::Renewed);
        }

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM budgets WHERE id = $1")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        if exists > 0 {
            Ok(Renewal::AlreadyCurrent)
        } else {
            Err(StoreError::NotFound)
        }
    }
}
