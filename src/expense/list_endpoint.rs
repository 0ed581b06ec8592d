//! Defines the endpoint for listing the caller's expenses.

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    AppState, Error,
    expense::{Expense, ExpenseStore, summary::sum_amounts},
    owner::{UserIdHeader, owner_id},
};

/// The state needed to list expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    /// The store for reading expenses.
    pub expense_store: ExpenseStore,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The caller's expenses and their total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseList {
    /// The expenses, most recent first.
    pub expenses: Vec<Expense>,
    /// The exact sum of the amounts of `expenses`.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    /// The number of expenses.
    pub count: usize,
}

impl ExpenseList {
    fn new(expenses: Vec<Expense>) -> Self {
        Self {
            total_amount: sum_amounts(&expenses),
            count: expenses.len(),
            expenses,
        }
    }
}

/// A route handler for listing the expenses owned by the caller.
pub async fn list_expenses_endpoint(
    State(state): State<ListExpensesState>,
    user_id: Option<TypedHeader<UserIdHeader>>,
) -> Result<Response, Error> {
    let owner = owner_id(user_id);
    let expenses = state.expense_store.list(owner.as_deref())?;

    Ok(Json(ExpenseList::new(expenses)).into_response())
}
