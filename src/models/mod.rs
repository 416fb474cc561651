pub mod budget;
pub mod expense;
pub mod user;

pub use budget::{Budget, CreateBudget, Renewal, UpdateBudget};
pub use expense::{
    to_records, CreateExpense, Expense, ExpenseChanges, NewExpense, UpdateExpense,
    PREDEFINED_CATEGORIES,
};
pub use user::{CreateUser, LoginRequest, TokenResponse, User, UserResponse};
