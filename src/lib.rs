//! Personal budget tracker: expenses, per-category monthly budgets, windowed
//! analytics and a scheduled monthly budget rollover, served over axum.

pub mod analytics;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod utils;
pub mod validation;

pub use app::{create_router, AppState};
