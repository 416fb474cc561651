pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod expenses;
pub mod vision;

pub async fn index() -> &'static str {
    "Budget Tracker API is running!"
}
