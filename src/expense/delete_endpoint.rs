//! Defines the endpoint for deleting an expense.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use serde::Serialize;

use crate::{
    AppState, Error,
    document::DocumentId,
    expense::ExpenseStore,
    owner::{UserIdHeader, owner_id},
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The store for deleting expenses.
    pub expense_store: ExpenseStore,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeletedMessage {
    message: &'static str,
}

/// A route handler for deleting an expense owned by the caller.
///
/// Responds with 404 if the expense does not exist or belongs to someone else.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Path(expense_id): Path<DocumentId>,
    user_id: Option<TypedHeader<UserIdHeader>>,
) -> Result<Response, Error> {
    let owner = owner_id(user_id);

    if !state.expense_store.delete(&expense_id, owner.as_deref())? {
        return Err(Error::NotFound);
    }

    Ok(Json(DeletedMessage {
        message: "Expense deleted successfully",
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::extract::{Path, State};
    use axum_extra::TypedHeader;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        expense::{Expense, ExpenseFields},
        owner::UserIdHeader,
        test_utils::{assert_status_ok, get_test_expense_store, parse_json_body},
    };

    use super::{DeleteExpenseState, delete_expense_endpoint};

    fn create_coffee(state: &DeleteExpenseState, owner: Option<&str>) -> Expense {
        state
            .expense_store
            .create(
                ExpenseFields {
                    title: "Coffee".to_owned(),
                    amount: Decimal::from_str("4.50").unwrap(),
                    category: "Food".to_owned(),
                    date: date!(2024 - 03 - 01),
                },
                owner,
            )
            .unwrap()
    }

    #[tokio::test]
    async fn can_delete_expense() {
        let state = DeleteExpenseState {
            expense_store: get_test_expense_store(),
        };
        let created = create_coffee(&state, Some("alice"));

        let response = delete_expense_endpoint(
            State(state.clone()),
            Path(created.id.clone()),
            Some(TypedHeader(UserIdHeader("alice".to_owned()))),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        assert_eq!(
            parse_json_body(response).await,
            serde_json::json!({ "message": "Expense deleted successfully" })
        );
        assert_eq!(state.expense_store.get_by_id(&created.id), Ok(None));
    }

    #[tokio::test]
    async fn cannot_delete_other_users_expense() {
        let state = DeleteExpenseState {
            expense_store: get_test_expense_store(),
        };
        let created = create_coffee(&state, Some("alice"));

        let result = delete_expense_endpoint(State(state.clone()), Path(created.id.clone()), None).await;

        assert_eq!(result.err(), Some(Error::NotFound));
        assert_eq!(
            state.expense_store.get_by_id(&created.id).unwrap(),
            Some(created)
        );
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let state = DeleteExpenseState {
            expense_store: get_test_expense_store(),
        };

        let result =
            delete_expense_endpoint(State(state), Path("missing".to_owned()), None).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
