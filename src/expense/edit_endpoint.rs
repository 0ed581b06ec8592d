//! Defines the endpoint for replacing the fields of an expense.

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;

use crate::{
    AppState, Error,
    document::DocumentId,
    expense::{ExpenseRequest, ExpenseStore},
    owner::{UserIdHeader, owner_id},
    timezone::LocalTimezone,
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    /// The store for saving expenses.
    pub expense_store: ExpenseStore,
    /// The time zone that decides what today's date is.
    pub local_timezone: LocalTimezone,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            local_timezone: state.local_timezone,
        }
    }
}

/// A route handler for replacing the fields of an expense owned by the caller.
///
/// The body is validated before the expense is looked up. Responds with 404
/// if the expense does not exist or belongs to someone else.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    Path(expense_id): Path<DocumentId>,
    user_id: Option<TypedHeader<UserIdHeader>>,
    body: Result<Json<ExpenseRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = body.map_err(|rejection| Error::InvalidJson(rejection.body_text()))?;
    let fields = request.validate(state.local_timezone.today())?;

    let owner = owner_id(user_id);

    match state
        .expense_store
        .update(&expense_id, fields, owner.as_deref())?
    {
        Some(expense) => Ok(Json(expense).into_response()),
        None => Err(Error::NotFound),
    }
}
