//! Defines the endpoint for creating a new expense.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;

use crate::{
    AppState, Error,
    expense::{ExpenseRequest, ExpenseStore},
    owner::{UserIdHeader, owner_id},
    timezone::LocalTimezone,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The store for saving expenses.
    pub expense_store: ExpenseStore,
    /// The time zone that decides what today's date is.
    pub local_timezone: LocalTimezone,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            local_timezone: state.local_timezone,
        }
    }
}

/// A route handler for creating a new expense owned by the caller.
///
/// Responds with 201 Created and the new expense.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    user_id: Option<TypedHeader<UserIdHeader>>,
    body: Result<Json<ExpenseRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body.map_err(|rejection| Error::InvalidJson(rejection.body_text()))?;
    let fields = request.validate(state.local_timezone.today())?;

    let owner = owner_id(user_id);
    let expense = state.expense_store.create(fields, owner.as_deref())?;

    Ok((StatusCode::CREATED, Json(expense)).into_response())
}
