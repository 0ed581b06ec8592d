//! Defines the endpoint for getting a single expense.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, document::DocumentId, expense::ExpenseStore};

/// The state needed to get an expense.
#[derive(Debug, Clone)]
pub struct GetExpenseState {
    /// The store for reading expenses.
    pub expense_store: ExpenseStore,
}

impl FromRef<AppState> for GetExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// A route handler for getting an expense by its ID.
///
/// Any caller may read any expense.
pub async fn get_expense_endpoint(
    State(state): State<GetExpenseState>,
    Path(expense_id): Path<DocumentId>,
) -> Result<Response, Error> {
    match state.expense_store.get_by_id(&expense_id)? {
        Some(expense) => Ok(Json(expense).into_response()),
        None => Err(Error::NotFound),
    }
}
