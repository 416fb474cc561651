use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

use budget_tracker::{
    models::{Budget, Renewal},
    scheduler::{RolloverJob, RolloverState},
    store::{BudgetStore, MemoryStore, StoreError, StoreResult},
};

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

async fn seed(store: &MemoryStore) -> Vec<Budget> {
    let mut budgets = Vec::new();
    for (category, limit) in [("Food", 300), ("Transport", 120), ("Housing", 1500)] {
        budgets.push(
            store
                .create_budget(Uuid::new_v4(), category, Decimal::new(limit, 0))
                .await
                .unwrap(),
        );
    }
    budgets
}

/// Delegates to a `MemoryStore`, optionally failing renewal of one row or
/// holding `all_budgets` open until released so a second trigger can arrive
/// mid-run.
#[derive(Default)]
struct Scripted {
    inner: MemoryStore,
    broken: Option<Uuid>,
    gated: bool,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl BudgetStore for Scripted {
    async fn list_budgets(&self, user_id: Uuid) -> StoreResult<Vec<Budget>> {
        self.inner.list_budgets(user_id).await
    }

    async fn create_budget(
        &self,
        user_id: Uuid,
        category: &str,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        self.inner.create_budget(user_id, category, limit_amount).await
    }

    async fn update_budget_limit(
        &self,
        user_id: Uuid,
        id: Uuid,
        limit_amount: Decimal,
    ) -> StoreResult<Budget> {
        self.inner.update_budget_limit(user_id, id, limit_amount).await
    }

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> StoreResult<Budget> {
        self.inner.delete_budget(user_id, id).await
    }

    async fn all_budgets(&self) -> StoreResult<Vec<Budget>> {
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.all_budgets().await
    }

    async fn renew_budget(&self, id: Uuid, period: &str) -> StoreResult<Renewal> {
        if self.broken == Some(id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.renew_budget(id, period).await
    }
}

#[tokio::test]
async fn second_run_in_same_month_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let seeded = seed(&store).await;
    let job = RolloverJob::new(store.clone());

    let first = job.run(at(2025, 3, 1)).await.unwrap().unwrap();
    assert_eq!(first.period, "2025-03");
    assert_eq!(first.renewed, 3);
    assert_eq!(first.failed, 0);

    let second = job.run(at(2025, 3, 15)).await.unwrap().unwrap();
    assert_eq!(second.renewed, 0);
    assert_eq!(second.already_current, 3);

    assert_eq!(store.budget_count().await, 3);
    let after = store.all_budgets().await.unwrap();
    for budget in &seeded {
        let current = after.iter().find(|b| b.id == budget.id).unwrap();
        assert_eq!(current.limit_amount, budget.limit_amount);
        assert_eq!(current.renewed_period.as_deref(), Some("2025-03"));
    }
}

#[tokio::test]
async fn next_month_renews_again_with_same_limits() {
    let store = Arc::new(MemoryStore::new());
    let seeded = seed(&store).await;
    let job = RolloverJob::new(store.clone());

    job.run(at(2025, 3, 1)).await.unwrap().unwrap();
    let april = job.run(at(2025, 4, 1)).await.unwrap().unwrap();
    assert_eq!(april.renewed, 3);

    let after = store.all_budgets().await.unwrap();
    for budget in &seeded {
        let current = after.iter().find(|b| b.id == budget.id).unwrap();
        assert_eq!(current.limit_amount, budget.limit_amount);
        assert_eq!(current.renewed_period.as_deref(), Some("2025-04"));
    }
}

#[tokio::test]
async fn one_failing_row_does_not_stop_the_others() {
    let inner = MemoryStore::new();
    let seeded = seed(&inner).await;
    let store = Arc::new(Scripted {
        inner,
        broken: Some(seeded[1].id),
        ..Scripted::default()
    });
    let job = RolloverJob::new(store.clone());

    let report = job.run(at(2025, 6, 1)).await.unwrap().unwrap();
    assert_eq!(report.renewed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(job.state(), RolloverState::Idle);

    let after = store.all_budgets().await.unwrap();
    let broken = after.iter().find(|b| b.id == seeded[1].id).unwrap();
    assert_eq!(broken.renewed_period, None);
    let renewed = after.iter().filter(|b| b.renewed_period.as_deref() == Some("2025-06")).count();
    assert_eq!(renewed, 2);
}

#[tokio::test]
async fn overlapping_trigger_is_skipped() {
    let inner = MemoryStore::new();
    seed(&inner).await;
    let store = Arc::new(Scripted {
        inner,
        gated: true,
        ..Scripted::default()
    });
    let job = Arc::new(RolloverJob::new(store.clone()));

    let running = {
        let job = Arc::clone(&job);
        tokio::spawn(async move { job.run(at(2025, 7, 1)).await })
    };

    store.entered.notified().await;
    assert_eq!(job.state(), RolloverState::Running);
    assert!(job.run(at(2025, 7, 1)).await.is_none());

    store.release.notify_one();
    let report = running.await.unwrap().unwrap().unwrap();
    assert_eq!(report.renewed, 3);
    assert_eq!(job.state(), RolloverState::Idle);
}

#[tokio::test]
async fn empty_store_is_a_clean_run() {
    let job = RolloverJob::new(Arc::new(MemoryStore::new()));
    let report = job.run(at(2025, 1, 1)).await.unwrap().unwrap();
    assert_eq!(report.renewed + report.already_current + report.failed, 0);
    assert_eq!(job.state(), RolloverState::Idle);
}
