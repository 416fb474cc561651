use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::AppConfig,
    handlers::{self, vision::VisionClient},
    store::{BudgetStore, ExpenseStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub expenses: Arc<dyn ExpenseStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub config: Arc<AppConfig>,
    pub vision: Option<Arc<VisionClient>>,
}

impl AppState {
    /// Backs every store seam with the same implementation.
    pub fn new<S>(store: Arc<S>, config: AppConfig) -> Self
    where
        S: UserStore + ExpenseStore + BudgetStore + 'static,
    {
        Self {
            users: store.clone(),
            expenses: store.clone(),
            budgets: store,
            config: Arc::new(config),
            vision: None,
        }
    }

    pub fn with_vision(mut self, client: VisionClient) -> Self {
        self.vision = Some(Arc::new(client));
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Users
        .route("/users", post(handlers::auth::register).get(handlers::auth::me))
        .route("/users/login", post(handlers::auth::login))
        .route("/users/logout", post(handlers::auth::logout))
        // Expenses
        .route(
            "/expenses",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route("/expenses/categories", get(handlers::expenses::categories))
        .route(
            "/expenses/:id",
            put(handlers::expenses::update_expense).delete(handlers::expenses::delete_expense),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::budgets::list_budgets).post(handlers::budgets::create_budget),
        )
        .route("/budgets/status", get(handlers::budgets::budget_status))
        .route(
            "/budgets/:id",
            put(handlers::budgets::update_budget).delete(handlers::budgets::delete_budget),
        )
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/dashboard/summary", get(handlers::dashboard::summary))
        // Receipt scanning
        .route("/api/vision", post(handlers::vision::analyze_receipt))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)), // 10MB
        )
        .with_state(state)
}
