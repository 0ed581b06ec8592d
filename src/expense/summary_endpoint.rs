//! Defines the endpoint for summarising the caller's spending by category.

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
    expense::{
        ExpenseStore,
        summary::{CategoryTotal, category_totals, sum_amounts},
    },
    owner::{UserIdHeader, owner_id},
};

/// The state needed to summarise expenses.
#[derive(Debug, Clone)]
pub struct ExpenseSummaryState {
    /// The store for reading expenses.
    pub expense_store: ExpenseStore,
}

impl FromRef<AppState> for ExpenseSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
        }
    }
}

/// The caller's spending per category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// The total for each category, largest first.
    pub categories: Vec<CategoryTotal>,
    /// The total over all categories.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
}

/// A route handler for the per-category totals of the caller's expenses.
pub async fn get_expense_summary_endpoint(
    State(state): State<ExpenseSummaryState>,
    user_id: Option<TypedHeader<UserIdHeader>>,
) -> Result<Response, Error> {
    let owner = owner_id(user_id);
    let expenses = state.expense_store.list(owner.as_deref())?;

    Ok(Json(ExpenseSummary {
        categories: category_totals(&expenses),
        total_amount: sum_amounts(&expenses),
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::extract::State;
    use axum_extra::TypedHeader;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        expense::ExpenseFields,
        owner::UserIdHeader,
        test_utils::{assert_status_ok, get_test_expense_store, parse_json_body},
    };

    use super::{ExpenseSummaryState, get_expense_summary_endpoint};

    fn fields(category: &str, amount: &str) -> ExpenseFields {
        ExpenseFields {
            title: "Thing".to_owned(),
            amount: Decimal::from_str(amount).unwrap(),
            category: category.to_owned(),
            date: date!(2024 - 03 - 01),
        }
    }

    #[tokio::test]
    async fn summarises_callers_expenses_by_category() {
        let state = ExpenseSummaryState {
            expense_store: get_test_expense_store(),
        };
        for (category, amount, owner) in [
            ("Food", "4.50", "alice"),
            ("Rent", "400", "alice"),
            ("Food", "10.25", "alice"),
            ("Food", "99", "bob"),
        ] {
            state
                .expense_store
                .create(fields(category, amount), Some(owner))
                .unwrap();
        }

        let response = get_expense_summary_endpoint(
            State(state),
            Some(TypedHeader(UserIdHeader("alice".to_owned()))),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        assert_eq!(
            parse_json_body(response).await,
            serde_json::json!({
                "categories": [
                    { "category": "Rent", "totalAmount": 400, "count": 1 },
                    { "category": "Food", "totalAmount": 14.75, "count": 2 },
                ],
                "totalAmount": 414.75,
            })
        );
    }
}
