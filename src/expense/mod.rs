//! Expense tracking.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the validation of expense input
//! - The mapping between expenses and documents
//! - The ownership scoped `ExpenseStore` and spending totals
//! - The route handlers for the expense API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod mapper;
mod store;
mod summary;
mod summary_endpoint;

pub use core::{Expense, ExpenseFields, ExpenseRequest};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use get_endpoint::get_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use store::{EXPENSES_COLLECTION, ExpenseStore};
pub use summary::CategoryTotal;
pub use summary_endpoint::get_expense_summary_endpoint;
