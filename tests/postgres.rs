//! Runs against a real database when `DATABASE_URL` is set; otherwise each
//! test returns early.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use budget_tracker::{
    create_router,
    database::{create_database_pool, run_migrations},
    models::{ExpenseChanges, NewExpense, Renewal, User},
    scheduler::RolloverJob,
    store::{BudgetStore, ExpenseStore, PgStore, StoreError, UserStore},
    AppState,
};

mod common;

/// Test fixture holding a migrated pool behind the store.
struct TestContext {
    store: Arc<PgStore>,
}

impl TestContext {
    async fn new() -> Option<Self> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let pool = create_database_pool(&database_url)
            .await
            .expect("Failed to connect to database");
        run_migrations(&pool).await.expect("Failed to run migrations");

        Some(Self {
            store: Arc::new(PgStore::new(pool)),
        })
    }

    async fn user(&self) -> User {
        let email = format!("{}@test.example.com", Uuid::new_v4());
        self.store
            .create_user("Test User", &email, "not-a-real-hash")
            .await
            .expect("Failed to create user")
    }
}

#[tokio::test]
async fn renewal_is_idempotent_within_a_period() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let user = ctx.user().await;

    let food = ctx
        .store
        .create_budget(user.id, "Food", Decimal::new(30000, 2))
        .await
        .unwrap();
    ctx.store
        .create_budget(user.id, "Transport", Decimal::new(120, 0))
        .await
        .unwrap();

    assert_eq!(ctx.store.renew_budget(food.id, "2025-03").await.unwrap(), Renewal::Renewed);
    assert_eq!(
        ctx.store.renew_budget(food.id, "2025-03").await.unwrap(),
        Renewal::AlreadyCurrent
    );
    assert_eq!(ctx.store.renew_budget(food.id, "2025-04").await.unwrap(), Renewal::Renewed);

    let missing = ctx.store.renew_budget(Uuid::new_v4(), "2025-04").await;
    assert!(matches!(missing, Err(StoreError::NotFound)));

    let budgets = ctx.store.list_budgets(user.id).await.unwrap();
    assert_eq!(budgets.len(), 2);
    let food_after = budgets.iter().find(|b| b.id == food.id).unwrap();
    assert_eq!(food_after.limit_amount, Decimal::new(300, 0));
    assert_eq!(food_after.renewed_period.as_deref(), Some("2025-04"));
}

#[tokio::test]
async fn rollover_job_twice_keeps_rows_and_limits() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let user = ctx.user().await;
    let before = vec![
        ctx.store
            .create_budget(user.id, "Food", Decimal::new(300, 0))
            .await
            .unwrap(),
        ctx.store
            .create_budget(user.id, "Housing", Decimal::new(150000, 2))
            .await
            .unwrap(),
    ];

    // A period no other test uses, so the second run finds every row current.
    let when = NaiveDate::from_ymd_opt(2999, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let job = RolloverJob::new(ctx.store.clone());

    let first = job.run(when).await.unwrap().unwrap();
    assert_eq!(first.failed, 0);
    let second = job.run(when).await.unwrap().unwrap();
    assert_eq!(second.failed, 0);
    assert!(second.already_current >= before.len());

    let after = ctx.store.list_budgets(user.id).await.unwrap();
    assert_eq!(after.len(), before.len());
    for budget in &before {
        let current = after.iter().find(|b| b.id == budget.id).unwrap();
        assert_eq!(current.limit_amount, budget.limit_amount);
        assert_eq!(current.renewed_period.as_deref(), Some("2999-01"));
    }
}

#[tokio::test]
async fn duplicate_category_is_rejected_per_user() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let user = ctx.user().await;
    let other = ctx.user().await;

    ctx.store
        .create_budget(user.id, "Food", Decimal::new(100, 0))
        .await
        .unwrap();
    let duplicate = ctx
        .store
        .create_budget(user.id, "Food", Decimal::new(50, 0))
        .await;
    assert!(matches!(duplicate, Err(StoreError::Duplicate(_))));

    // Same category for another user is fine.
    ctx.store
        .create_budget(other.id, "Food", Decimal::new(50, 0))
        .await
        .unwrap();
}

#[tokio::test]
async fn partial_expense_update_keeps_stored_fields() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let user = ctx.user().await;
    let other = ctx.user().await;

    let expense = ctx
        .store
        .create_expense(
            user.id,
            NewExpense {
                category: "Food".to_string(),
                amount: Decimal::new(1250, 2),
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                description: Some("lunch".to_string()),
                is_recurring: false,
            },
        )
        .await
        .unwrap();

    let changes = ExpenseChanges {
        amount: Some(Decimal::new(20, 0)),
        ..ExpenseChanges::default()
    };
    let updated = ctx
        .store
        .update_expense(user.id, expense.id, changes.clone())
        .await
        .unwrap();
    assert_eq!(updated.amount, Decimal::new(20, 0));
    assert_eq!(updated.category, "Food");
    assert_eq!(updated.description.as_deref(), Some("lunch"));

    let foreign = ctx.store.update_expense(other.id, expense.id, changes).await;
    assert!(matches!(foreign, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn out_of_range_amount_is_a_validation_error() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };
    let app = create_router(AppState::new(ctx.store.clone(), common::test_config()));
    let email = format!("{}@test.example.com", Uuid::new_v4());

    let post = |uri: &str, token: Option<&str>, body: Value| {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    };

    let response = app
        .clone()
        .oneshot(post(
            "/users",
            None,
            json!({ "name": "Pg", "email": email, "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            "/users/login",
            None,
            json!({ "email": email, "password": "secret123" }),
        ))
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let token = serde_json::from_slice::<Value>(&bytes).unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let response = app
        .clone()
        .oneshot(post(
            "/expenses",
            Some(&token),
            json!({ "category": "Food", "amount": 10_000_000_000u64, "date": today }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post(
            "/expenses",
            Some(&token),
            json!({ "category": "Food", "amount": "9999999999.99", "date": today }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
